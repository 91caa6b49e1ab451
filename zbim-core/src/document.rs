use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::element::{
    Area, AreaTag, BuiltInParameter, Category, ColorFillLegend, ColorFillScheme, DesignOption,
    Element, ElementClass, ElementId, ElementKind, Level, Parameter, ParameterElement,
    ParameterId, ParameterValue, ScheduleDefinition, View, ViewFamily, ViewFamilyType,
    ViewSchedule, ViewType,
};
use crate::geometry::{Point2, Point3};
use crate::host::{HostDocument, HostError};

/// 内存中的宿主文档实现，元素按插入顺序保存。
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(try_from = "DocumentSnapshot")]
pub struct Document {
    elements: Vec<(ElementId, Element)>,
    next_element_id: u64,
}

/// 反序列化时的原始形态，校验后才转换为 `Document`。
#[derive(Deserialize)]
pub struct DocumentSnapshot {
    elements: Vec<(ElementId, Element)>,
    #[serde(default)]
    next_element_id: u64,
}

impl TryFrom<DocumentSnapshot> for Document {
    type Error = HostError;

    /// 拒绝重复 ID；计数器至少推进到最大 ID 之后。
    fn try_from(snapshot: DocumentSnapshot) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(snapshot.elements.len());
        for (id, _) in &snapshot.elements {
            if !seen.insert(*id) {
                return Err(HostError::DuplicateElementId(*id));
            }
        }
        let next_free = seen.iter().map(|id| id.get() + 1).max().unwrap_or(0);
        Ok(Self {
            elements: snapshot.elements,
            next_element_id: snapshot.next_element_id.max(next_free),
        })
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入元素。已绑定到该类别的项目参数会自动附加；
    /// 插入参数元素时则反向附加到现有的同类别元素上。
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        let id = self.next_id();
        self.attach_project_parameters(&mut element);

        if let ElementKind::ParameterElement(definition) = &element.kind {
            let template = Parameter::new(
                ParameterId::Project(id),
                element.name.clone(),
                ParameterValue::None,
            );
            for (_, existing) in self.elements.iter_mut() {
                let bound = definition.bound_categories.contains(&existing.category);
                let present = existing.parameters.iter().any(|p| p.name == template.name);
                if bound && !present {
                    existing.parameters.push(template.clone());
                }
            }
        }

        self.elements.push((id, element));
        id
    }

    pub fn add_level(&mut self, name: impl Into<String>, elevation: f64) -> ElementId {
        let element = Element::new(name, Category::Levels, ElementKind::Level(Level { elevation }))
            .with_parameter(Parameter::builtin(BuiltInParameter::LevelElevation, elevation));
        self.add_element(element)
    }

    pub fn add_design_option(&mut self, name: impl Into<String>, is_primary: bool) -> ElementId {
        self.add_element(Element::new(
            name,
            Category::DesignOptions,
            ElementKind::DesignOption(DesignOption { is_primary }),
        ))
    }

    pub fn add_view(&mut self, name: impl Into<String>, view_type: ViewType) -> ElementId {
        self.add_element(Element::new(
            name,
            Category::Views,
            ElementKind::View(View::new(view_type)),
        ))
    }

    pub fn add_view_template(&mut self, name: impl Into<String>, view_type: ViewType) -> ElementId {
        let mut view = View::new(view_type);
        view.is_template = true;
        self.add_element(Element::new(name, Category::Views, ElementKind::View(view)))
    }

    pub fn add_view_family_type(&mut self, name: impl Into<String>, family: ViewFamily) -> ElementId {
        self.add_element(Element::new(
            name,
            Category::ViewFamilyTypes,
            ElementKind::ViewFamilyType(ViewFamilyType { family }),
        ))
    }

    pub fn add_area_scheme(&mut self, name: impl Into<String>) -> ElementId {
        self.add_element(Element::new(name, Category::AreaSchemes, ElementKind::AreaScheme))
    }

    pub fn add_area_plan(
        &mut self,
        name: impl Into<String>,
        area_scheme: ElementId,
        type_id: Option<ElementId>,
    ) -> ElementId {
        let mut view = View::new(ViewType::AreaPlan);
        view.area_scheme = Some(area_scheme);
        view.type_id = type_id;
        self.add_element(Element::new(name, Category::Views, ElementKind::View(view)))
    }

    pub fn add_schedule(&mut self, name: impl Into<String>, definition: ScheduleDefinition) -> ElementId {
        self.add_element(Element::new(
            name,
            Category::Schedules,
            ElementKind::Schedule(ViewSchedule {
                view_type: ViewType::Schedule,
                is_template: false,
                definition,
            }),
        ))
    }

    pub fn add_color_fill_scheme(
        &mut self,
        name: impl Into<String>,
        category: Category,
        area_scheme: ElementId,
    ) -> ElementId {
        self.add_element(Element::new(
            name,
            Category::ColorFillSchema,
            ElementKind::ColorFillScheme(ColorFillScheme {
                category,
                area_scheme,
            }),
        ))
    }

    /// 定义项目参数并绑定到给定类别，返回参数元素 ID。
    pub fn add_project_parameter(
        &mut self,
        name: impl Into<String>,
        categories: impl IntoIterator<Item = Category>,
    ) -> ElementId {
        self.add_element(Element::new(
            name,
            Category::ProjectParameters,
            ElementKind::ParameterElement(ParameterElement {
                bound_categories: categories.into_iter().collect(),
            }),
        ))
    }

    /// 添加普通类别成员（设备、图纸等），附带 `Comments` 与 `Mark` 内置参数。
    pub fn add_instance(&mut self, name: impl Into<String>, category: Category) -> ElementId {
        let element = Element::new(name, category, ElementKind::Instance)
            .with_parameter(Parameter::builtin(BuiltInParameter::Comments, ""))
            .with_parameter(Parameter::builtin(BuiltInParameter::Mark, ""));
        self.add_element(element)
    }

    #[inline]
    pub fn entries(&self) -> impl Iterator<Item = &(ElementId, Element)> {
        self.elements.iter()
    }

    fn next_id(&mut self) -> ElementId {
        let id = ElementId::new(self.next_element_id);
        self.next_element_id += 1;
        id
    }

    fn attach_project_parameters(&self, element: &mut Element) {
        for (id, candidate) in &self.elements {
            let Some(definition) = candidate.as_parameter_element() else {
                continue;
            };
            if !definition.bound_categories.contains(&element.category) {
                continue;
            }
            if element.parameters.iter().any(|p| p.name == candidate.name) {
                continue;
            }
            element.parameters.push(Parameter::new(
                ParameterId::Project(*id),
                candidate.name.clone(),
                ParameterValue::None,
            ));
        }
    }

    fn name_taken(&self, name: &str) -> bool {
        self.elements.iter().any(|(_, element)| element.name == name)
    }

    fn unused_name(&self, first: String, numbered: impl Fn(u32) -> String) -> String {
        if !self.name_taken(&first) {
            return first;
        }
        (2..)
            .map(numbered)
            .find(|candidate| !self.name_taken(candidate))
            .unwrap_or(first)
    }

    fn require(&self, id: ElementId, expected: ElementClass) -> Result<&Element, HostError> {
        let element = self.element(id).ok_or(HostError::ElementNotFound(id))?;
        let actual = element.class();
        if actual != expected {
            return Err(HostError::UnexpectedKind {
                id,
                expected,
                actual,
            });
        }
        Ok(element)
    }
}

impl HostDocument for Document {
    fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements.iter().map(|(id, element)| (*id, element))
    }

    fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements
            .iter()
            .find_map(|(element_id, element)| (*element_id == id).then_some(element))
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements
            .iter_mut()
            .find_map(|(element_id, element)| (*element_id == id).then_some(element))
    }

    fn duplicate_view(&mut self, id: ElementId) -> Result<ElementId, HostError> {
        let source = self.element(id).ok_or(HostError::ElementNotFound(id))?;
        if !matches!(source.class(), ElementClass::View | ElementClass::Schedule) {
            return Err(HostError::CannotDuplicate(id));
        }
        let mut copy = source.clone();
        let base = copy.name.clone();
        copy.name = self.unused_name(format!("{base} Copy 1"), |n| format!("{base} Copy {n}"));
        Ok(self.add_element(copy))
    }

    fn create_schedule(
        &mut self,
        category: Category,
        area_scheme: Option<ElementId>,
    ) -> Result<ElementId, HostError> {
        let base = match area_scheme {
            Some(scheme) => {
                let scheme_name = self.require(scheme, ElementClass::AreaScheme)?.name.clone();
                if category != Category::Areas {
                    return Err(HostError::AreaSchemeCategory(category));
                }
                format!("Area Schedule ({scheme_name})")
            }
            None => format!("{} Schedule", category.display_name()),
        };
        let name = self.unused_name(base.clone(), |n| format!("{base} {n}"));
        Ok(self.add_schedule(name, ScheduleDefinition::new(category, area_scheme)))
    }

    fn create_area(&mut self, view: ElementId, point: Point2) -> Result<ElementId, HostError> {
        let plan = self
            .require(view, ElementClass::View)?
            .as_view()
            .filter(|v| v.view_type == ViewType::AreaPlan)
            .ok_or(HostError::NotAreaPlan(view))?;
        let area_scheme = plan.area_scheme;
        let placed = self
            .elements
            .iter()
            .filter(|(_, element)| element.as_area().is_some_and(|area| area.view == view))
            .count();

        let element = Element::new(
            "Area",
            Category::Areas,
            ElementKind::Area(Area {
                view,
                area_scheme,
                location: point,
                number: (placed + 1).to_string(),
            }),
        )
        .with_parameter(Parameter::builtin(BuiltInParameter::Comments, ""))
        .with_parameter(Parameter::builtin(BuiltInParameter::AreaValue, 0.0));
        Ok(self.add_element(element))
    }

    fn create_area_tag(
        &mut self,
        view: ElementId,
        area: ElementId,
        point: Point2,
    ) -> Result<ElementId, HostError> {
        self.require(view, ElementClass::View)?;
        self.require(area, ElementClass::Area)?;
        Ok(self.add_element(Element::new(
            "Area Tag",
            Category::AreaTags,
            ElementKind::AreaTag(AreaTag {
                view,
                area,
                head: point.to_point3(),
                has_leader: true,
            }),
        )))
    }

    fn create_color_fill_legend(
        &mut self,
        view: ElementId,
        category: Category,
        origin: Point3,
    ) -> Result<ElementId, HostError> {
        let bound = self
            .require(view, ElementClass::View)?
            .as_view()
            .and_then(|v| v.color_fill_scheme(category));
        if bound.is_none() {
            return Err(HostError::NoColorFillScheme { view, category });
        }
        Ok(self.add_element(Element::new(
            "Color Fill Legend",
            Category::ColorFillLegends,
            ElementKind::ColorFillLegend(ColorFillLegend {
                view,
                category,
                origin,
            }),
        )))
    }
}
