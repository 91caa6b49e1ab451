use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point2, Point3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(u64);

impl ElementId {
    #[inline]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// 提供原始数值，便于序列化或日志输出。
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 宿主内置类别。元素总是恰好属于其中之一。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Levels,
    DesignOptions,
    Views,
    Schedules,
    ViewFamilyTypes,
    AreaSchemes,
    ColorFillSchema,
    ColorFillLegends,
    ProjectParameters,
    Areas,
    AreaTags,
    MechanicalEquipment,
    Sheets,
    Walls,
    GenericModels,
}

impl Category {
    pub fn display_name(self) -> &'static str {
        match self {
            Category::Levels => "Levels",
            Category::DesignOptions => "Design Options",
            Category::Views => "Views",
            Category::Schedules => "Schedules",
            Category::ViewFamilyTypes => "View Family Types",
            Category::AreaSchemes => "Area Schemes",
            Category::ColorFillSchema => "Color Fill Schema",
            Category::ColorFillLegends => "Color Fill Legends",
            Category::ProjectParameters => "Project Parameters",
            Category::Areas => "Areas",
            Category::AreaTags => "Area Tags",
            Category::MechanicalEquipment => "Mechanical Equipment",
            Category::Sheets => "Sheets",
            Category::Walls => "Walls",
            Category::GenericModels => "Generic Models",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltInParameter {
    Comments,
    Mark,
    AreaValue,
    LevelElevation,
}

impl BuiltInParameter {
    /// 参数在界面中的定义名，`parameter` 查找按此名称匹配。
    pub fn definition_name(self) -> &'static str {
        match self {
            BuiltInParameter::Comments => "Comments",
            BuiltInParameter::Mark => "Mark",
            BuiltInParameter::AreaValue => "Area",
            BuiltInParameter::LevelElevation => "Elevation",
        }
    }
}

/// 参数标识：内置参数或由 `ParameterElement` 定义的项目参数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterId {
    BuiltIn(BuiltInParameter),
    Project(ElementId),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ParameterValue {
    #[default]
    None,
    String(String),
    Integer(i64),
    Double(f64),
    ElementId(ElementId),
}

impl ParameterValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::String(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::String(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Integer(value)
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        ParameterValue::Integer(value.into())
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Double(value)
    }
}

impl From<ElementId> for ParameterValue {
    fn from(value: ElementId) -> Self {
        ParameterValue::ElementId(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: ParameterId,
    pub name: String,
    pub value: ParameterValue,
}

impl Parameter {
    pub fn new(id: ParameterId, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        Self {
            id,
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn builtin(parameter: BuiltInParameter, value: impl Into<ParameterValue>) -> Self {
        Self::new(
            ParameterId::BuiltIn(parameter),
            parameter.definition_name(),
            value,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewType {
    FloorPlan,
    CeilingPlan,
    AreaPlan,
    EngineeringPlan,
    Elevation,
    Section,
    ThreeD,
    DrawingSheet,
    Legend,
    Schedule,
    PanelSchedule,
}

impl ViewType {
    /// 对应宿主 `ViewPlan` 类的视图类型。
    #[inline]
    pub fn is_plan(self) -> bool {
        matches!(
            self,
            ViewType::FloorPlan | ViewType::CeilingPlan | ViewType::AreaPlan | ViewType::EngineeringPlan
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewFamily {
    FloorPlan,
    CeilingPlan,
    AreaPlan,
    StructuralPlan,
    Elevation,
    Section,
    ThreeDimensional,
    Schedule,
    Legend,
    Sheet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorFillBinding {
    pub category: Category,
    pub scheme: ElementId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub view_type: ViewType,
    pub is_template: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_scheme: Option<ElementId>,
    #[serde(default)]
    pub color_fill: Vec<ColorFillBinding>,
}

impl View {
    pub fn new(view_type: ViewType) -> Self {
        Self {
            view_type,
            is_template: false,
            type_id: None,
            area_scheme: None,
            color_fill: Vec::new(),
        }
    }

    /// 返回指定类别上绑定的颜色填充方案，未绑定时为 `None`。
    pub fn color_fill_scheme(&self, category: Category) -> Option<ElementId> {
        self.color_fill
            .iter()
            .find(|binding| binding.category == category)
            .map(|binding| binding.scheme)
    }

    /// 每个类别至多一个绑定，已有绑定会被替换。
    pub fn set_color_fill_scheme(&mut self, category: Category, scheme: ElementId) {
        match self
            .color_fill
            .iter_mut()
            .find(|binding| binding.category == category)
        {
            Some(binding) => binding.scheme = scheme,
            None => self.color_fill.push(ColorFillBinding { category, scheme }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Instance,
    ElementType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleField {
    pub parameter: ParameterId,
    pub field_type: FieldType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterType {
    Equal,
    NotEqual,
    Contains,
    BeginsWith,
    GreaterThan,
    LessThan,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum FilterValue {
    #[default]
    None,
    String(String),
    Integer(i64),
    Double(f64),
    ElementId(ElementId),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::String(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Double(value)
    }
}

/// 明细表的位置过滤器，引用定义中的字段序号。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleFilter {
    pub field_index: usize,
    pub filter_type: FilterType,
    value: FilterValue,
}

impl ScheduleFilter {
    pub fn new(field_index: usize, filter_type: FilterType, value: impl Into<FilterValue>) -> Self {
        Self {
            field_index,
            filter_type,
            value: value.into(),
        }
    }

    #[inline]
    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    #[inline]
    pub fn is_string_value(&self) -> bool {
        matches!(self.value, FilterValue::String(_))
    }

    pub fn set_value(&mut self, value: impl Into<FilterValue>) {
        self.value = value.into();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDefinition {
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_scheme: Option<ElementId>,
    fields: Vec<ScheduleField>,
    filters: Vec<ScheduleFilter>,
}

impl ScheduleDefinition {
    pub fn new(category: Category, area_scheme: Option<ElementId>) -> Self {
        Self {
            category,
            area_scheme,
            fields: Vec::new(),
            filters: Vec::new(),
        }
    }

    #[inline]
    pub fn fields(&self) -> &[ScheduleField] {
        &self.fields
    }

    /// 追加字段并返回其序号；不检查重复。
    pub fn add_field(&mut self, field: ScheduleField) -> usize {
        self.fields.push(field);
        self.fields.len() - 1
    }

    #[inline]
    pub fn filters(&self) -> &[ScheduleFilter] {
        &self.filters
    }

    pub fn add_filter(&mut self, filter: ScheduleFilter) {
        self.filters.push(filter);
    }

    /// 按位置取出过滤器副本；修改后需通过 [`Self::set_filter`] 写回。
    pub fn filter(&self, index: usize) -> Option<ScheduleFilter> {
        self.filters.get(index).cloned()
    }

    /// 覆盖指定位置的过滤器，位置不存在时返回 `false`。
    pub fn set_filter(&mut self, index: usize, filter: ScheduleFilter) -> bool {
        match self.filters.get_mut(index) {
            Some(slot) => {
                *slot = filter;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSchedule {
    pub view_type: ViewType,
    pub is_template: bool,
    pub definition: ScheduleDefinition,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub elevation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignOption {
    pub is_primary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFamilyType {
    pub family: ViewFamily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorFillScheme {
    pub category: Category,
    pub area_scheme: ElementId,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorFillLegend {
    pub view: ElementId,
    pub category: Category,
    pub origin: Point3,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterElement {
    pub bound_categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub view: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_scheme: Option<ElementId>,
    pub location: Point2,
    pub number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaTag {
    pub view: ElementId,
    pub area: ElementId,
    pub head: Point3,
    pub has_leader: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    Level(Level),
    DesignOption(DesignOption),
    View(View),
    Schedule(ViewSchedule),
    ViewFamilyType(ViewFamilyType),
    AreaScheme,
    ColorFillScheme(ColorFillScheme),
    ColorFillLegend(ColorFillLegend),
    ParameterElement(ParameterElement),
    Area(Area),
    AreaTag(AreaTag),
    /// 其他类别成员（设备、图纸、墙体等），仅携带名称与参数。
    Instance,
}

/// `ElementKind` 的无负载判别值，作为查询层的“种类”参数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementClass {
    Level,
    DesignOption,
    View,
    Schedule,
    ViewFamilyType,
    AreaScheme,
    ColorFillScheme,
    ColorFillLegend,
    ParameterElement,
    Area,
    AreaTag,
    Instance,
}

impl ElementKind {
    pub fn class(&self) -> ElementClass {
        match self {
            ElementKind::Level(_) => ElementClass::Level,
            ElementKind::DesignOption(_) => ElementClass::DesignOption,
            ElementKind::View(_) => ElementClass::View,
            ElementKind::Schedule(_) => ElementClass::Schedule,
            ElementKind::ViewFamilyType(_) => ElementClass::ViewFamilyType,
            ElementKind::AreaScheme => ElementClass::AreaScheme,
            ElementKind::ColorFillScheme(_) => ElementClass::ColorFillScheme,
            ElementKind::ColorFillLegend(_) => ElementClass::ColorFillLegend,
            ElementKind::ParameterElement(_) => ElementClass::ParameterElement,
            ElementKind::Area(_) => ElementClass::Area,
            ElementKind::AreaTag(_) => ElementClass::AreaTag,
            ElementKind::Instance => ElementClass::Instance,
        }
    }
}

/// 文档成员：名称、类别、参数集合加上种类相关的数据。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub kind: ElementKind,
}

impl Element {
    pub fn new(name: impl Into<String>, category: Category, kind: ElementKind) -> Self {
        Self {
            name: name.into(),
            category,
            parameters: Vec::new(),
            kind,
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[inline]
    pub fn class(&self) -> ElementClass {
        self.kind.class()
    }

    pub fn as_level(&self) -> Option<&Level> {
        match &self.kind {
            ElementKind::Level(level) => Some(level),
            _ => None,
        }
    }

    pub fn as_view(&self) -> Option<&View> {
        match &self.kind {
            ElementKind::View(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_view_mut(&mut self) -> Option<&mut View> {
        match &mut self.kind {
            ElementKind::View(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_schedule(&self) -> Option<&ViewSchedule> {
        match &self.kind {
            ElementKind::Schedule(schedule) => Some(schedule),
            _ => None,
        }
    }

    pub fn as_schedule_mut(&mut self) -> Option<&mut ViewSchedule> {
        match &mut self.kind {
            ElementKind::Schedule(schedule) => Some(schedule),
            _ => None,
        }
    }

    pub fn as_view_family_type(&self) -> Option<&ViewFamilyType> {
        match &self.kind {
            ElementKind::ViewFamilyType(family_type) => Some(family_type),
            _ => None,
        }
    }

    pub fn as_color_fill_scheme(&self) -> Option<&ColorFillScheme> {
        match &self.kind {
            ElementKind::ColorFillScheme(scheme) => Some(scheme),
            _ => None,
        }
    }

    pub fn as_color_fill_legend(&self) -> Option<&ColorFillLegend> {
        match &self.kind {
            ElementKind::ColorFillLegend(legend) => Some(legend),
            _ => None,
        }
    }

    pub fn as_parameter_element(&self) -> Option<&ParameterElement> {
        match &self.kind {
            ElementKind::ParameterElement(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn as_area(&self) -> Option<&Area> {
        match &self.kind {
            ElementKind::Area(area) => Some(area),
            _ => None,
        }
    }

    pub fn as_area_mut(&mut self) -> Option<&mut Area> {
        match &mut self.kind {
            ElementKind::Area(area) => Some(area),
            _ => None,
        }
    }

    pub fn as_area_tag(&self) -> Option<&AreaTag> {
        match &self.kind {
            ElementKind::AreaTag(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn as_area_tag_mut(&mut self) -> Option<&mut AreaTag> {
        match &mut self.kind {
            ElementKind::AreaTag(tag) => Some(tag),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_filters_are_positional_copies() {
        let mut definition = ScheduleDefinition::new(Category::Sheets, None);
        definition.add_field(ScheduleField {
            parameter: ParameterId::BuiltIn(BuiltInParameter::Mark),
            field_type: FieldType::Instance,
        });
        definition.add_filter(ScheduleFilter::new(0, FilterType::Equal, "A"));

        let mut copy = definition.filter(0).expect("filter 0 exists");
        assert!(copy.is_string_value());
        copy.set_value("B");
        assert_eq!(definition.filters()[0].value(), &FilterValue::from("A"));

        assert!(definition.set_filter(0, copy));
        assert_eq!(definition.filters()[0].value(), &FilterValue::from("B"));

        assert!(definition.filter(1).is_none());
        let numeric = ScheduleFilter::new(0, FilterType::GreaterThan, 3_i64);
        assert!(!numeric.is_string_value());
        assert!(!definition.set_filter(1, numeric));
    }

    #[test]
    fn view_keeps_one_color_fill_binding_per_category() {
        let mut view = View::new(ViewType::AreaPlan);
        assert!(view.color_fill_scheme(Category::Areas).is_none());

        view.set_color_fill_scheme(Category::Areas, ElementId::new(7));
        view.set_color_fill_scheme(Category::Areas, ElementId::new(9));
        assert_eq!(view.color_fill.len(), 1);
        assert_eq!(view.color_fill_scheme(Category::Areas), Some(ElementId::new(9)));
        assert!(ViewType::AreaPlan.is_plan());
        assert!(!ViewType::Schedule.is_plan());
    }

    #[test]
    fn element_accessors_match_kind() {
        let level = Element::new("Level 1", Category::Levels, ElementKind::Level(Level { elevation: 0.0 }))
            .with_parameter(Parameter::builtin(BuiltInParameter::LevelElevation, 0.0));
        assert_eq!(level.class(), ElementClass::Level);
        assert!(level.as_level().is_some());
        assert!(level.as_view().is_none());
        assert_eq!(level.parameters[0].name, "Elevation");
        assert_eq!(ParameterValue::from("x").as_str(), Some("x"));
        assert_eq!(ParameterValue::from(3_i32), ParameterValue::Integer(3));
    }
}
