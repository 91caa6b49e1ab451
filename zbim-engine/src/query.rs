//! 实体查询层：在无序、类型混杂的元素集合中按名称、子串或类别解析实体。
//!
//! 未找到始终以 `None` / 空集合表示，不视为错误。名称匹配区分大小写，
//! 不做任何规范化。除标高外，返回顺序即宿主的枚举顺序；标高一律按
//! 高程升序返回。

use zbim_core::element::{Category, Element, ElementClass, ElementId, ViewType};
use zbim_core::host::HostDocument;

/// 视为“楼层”标高的名称关键字。
pub const FLOOR_LEVEL_KEYWORDS: [&str; 2] = ["Floor", "Level"];

fn of_kind<D: HostDocument>(doc: &D, kind: ElementClass) -> Vec<(ElementId, &Element)> {
    let mut found: Vec<_> = doc
        .elements()
        .filter(|(_, element)| element.class() == kind)
        .collect();
    if kind == ElementClass::Level {
        found.sort_by(|(_, a), (_, b)| elevation(a).total_cmp(&elevation(b)));
    }
    found
}

fn elevation(element: &Element) -> f64 {
    element.as_level().map_or(0.0, |level| level.elevation)
}

fn ids<'a>(items: impl IntoIterator<Item = (ElementId, &'a Element)>) -> Vec<ElementId> {
    items.into_iter().map(|(id, _)| id).collect()
}

pub fn find_all_by_kind<D: HostDocument>(doc: &D, kind: ElementClass) -> Vec<ElementId> {
    ids(of_kind(doc, kind))
}

pub fn find_by_exact_name<D: HostDocument>(
    doc: &D,
    kind: ElementClass,
    name: &str,
) -> Option<ElementId> {
    of_kind(doc, kind)
        .into_iter()
        .find(|(_, element)| element.name == name)
        .map(|(id, _)| id)
}

pub fn find_by_name_contains<D: HostDocument>(
    doc: &D,
    kind: ElementClass,
    substring: &str,
) -> Option<ElementId> {
    of_kind(doc, kind)
        .into_iter()
        .find(|(_, element)| element.name.contains(substring))
        .map(|(id, _)| id)
}

pub fn find_all_by_name_contains<D: HostDocument>(
    doc: &D,
    kind: ElementClass,
    substring: &str,
) -> Vec<ElementId> {
    ids(of_kind(doc, kind)
        .into_iter()
        .filter(|(_, element)| element.name.contains(substring)))
}

pub fn find_all_in_category<D: HostDocument>(doc: &D, category: Category) -> Vec<ElementId> {
    ids(doc.elements().filter(|(_, element)| element.category == category))
}

pub fn area_scheme_by_name<D: HostDocument>(doc: &D, name: &str) -> Option<ElementId> {
    find_by_exact_name(doc, ElementClass::AreaScheme, name)
}

pub fn all_design_options<D: HostDocument>(doc: &D) -> Vec<ElementId> {
    ids(doc.elements().filter(|(_, element)| {
        element.category == Category::DesignOptions && element.class() == ElementClass::DesignOption
    }))
}

pub fn design_option_by_name<D: HostDocument>(doc: &D, name: &str) -> Option<ElementId> {
    all_design_options(doc)
        .into_iter()
        .find(|id| doc.element(*id).is_some_and(|element| element.name == name))
}

/// 全部标高，按高程升序；高程相同时保持宿主顺序。
pub fn all_levels<D: HostDocument>(doc: &D) -> Vec<ElementId> {
    find_all_by_kind(doc, ElementClass::Level)
}

/// 名称含 [`FLOOR_LEVEL_KEYWORDS`] 任一关键字的标高，按高程升序。
pub fn floor_level_ids<D: HostDocument>(doc: &D) -> Vec<ElementId> {
    ids(of_kind(doc, ElementClass::Level).into_iter().filter(|(_, element)| {
        FLOOR_LEVEL_KEYWORDS
            .iter()
            .any(|keyword| element.name.contains(keyword))
    }))
}

pub fn levels_by_name_contains<D: HostDocument>(doc: &D, word: &str) -> Vec<ElementId> {
    find_all_by_name_contains(doc, ElementClass::Level, word)
}

pub fn level_by_name<D: HostDocument>(doc: &D, name: &str) -> Option<ElementId> {
    find_by_exact_name(doc, ElementClass::Level, name)
}

fn schedules<D: HostDocument>(doc: &D) -> impl Iterator<Item = (ElementId, &Element)> {
    doc.elements().filter(|(_, element)| {
        element
            .as_schedule()
            .is_some_and(|schedule| schedule.view_type == ViewType::Schedule)
    })
}

/// 全部明细表视图（含样板），不含配电盘等其他明细表类型。
pub fn all_schedules<D: HostDocument>(doc: &D) -> Vec<ElementId> {
    ids(schedules(doc))
}

pub fn schedule_by_name_contains<D: HostDocument>(doc: &D, substring: &str) -> Option<ElementId> {
    schedules(doc)
        .find(|(_, element)| element.name.contains(substring))
        .map(|(id, _)| id)
}

pub fn all_schedules_by_name_contains<D: HostDocument>(doc: &D, substring: &str) -> Vec<ElementId> {
    ids(schedules(doc).filter(|(_, element)| element.name.contains(substring)))
}

pub fn schedule_template_by_name<D: HostDocument>(doc: &D, name: &str) -> Option<ElementId> {
    schedules(doc)
        .find(|(_, element)| {
            element.name == name && element.as_schedule().is_some_and(|s| s.is_template)
        })
        .map(|(id, _)| id)
}

/// 类别为视图的全部元素，含视图样板。
pub fn all_views<D: HostDocument>(doc: &D) -> Vec<ElementId> {
    ids(doc.elements().filter(|(_, element)| {
        element.category == Category::Views && element.as_view().is_some()
    }))
}

/// 平面类视图，排除样板。
pub fn all_view_plans<D: HostDocument>(doc: &D) -> Vec<ElementId> {
    ids(doc.elements().filter(|(_, element)| {
        element
            .as_view()
            .is_some_and(|view| view.view_type.is_plan() && !view.is_template)
    }))
}

pub fn all_area_plans<D: HostDocument>(doc: &D) -> Vec<ElementId> {
    all_view_plans(doc)
        .into_iter()
        .filter(|id| {
            doc.element(*id)
                .and_then(Element::as_view)
                .is_some_and(|view| view.view_type == ViewType::AreaPlan)
        })
        .collect()
}

/// 按视图族类型名称查找面积平面（样板亦参与匹配）。
pub fn area_plan_by_view_family_name<D: HostDocument>(doc: &D, family_name: &str) -> Option<ElementId> {
    doc.elements()
        .filter_map(|(id, element)| element.as_view().map(|view| (id, view)))
        .filter(|(_, view)| view.view_type == ViewType::AreaPlan)
        .find(|(_, view)| {
            view.type_id
                .and_then(|type_id| doc.element(type_id))
                .filter(|family_type| family_type.as_view_family_type().is_some())
                .is_some_and(|family_type| family_type.name == family_name)
        })
        .map(|(id, _)| id)
}

pub fn all_view_templates<D: HostDocument>(doc: &D) -> Vec<ElementId> {
    all_views(doc)
        .into_iter()
        .filter(|id| {
            doc.element(*id)
                .and_then(Element::as_view)
                .is_some_and(|view| view.is_template)
        })
        .collect()
}

pub fn view_template_by_name<D: HostDocument>(doc: &D, name: &str) -> Option<ElementId> {
    all_view_templates(doc)
        .into_iter()
        .find(|id| doc.element(*id).is_some_and(|element| element.name == name))
}

#[cfg(test)]
mod tests {
    use zbim_core::document::Document;
    use zbim_core::element::{ScheduleDefinition, ViewFamily};

    use super::*;

    fn names(doc: &Document, ids: &[ElementId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| doc.element(*id))
            .map(|element| element.name.clone())
            .collect()
    }

    #[test]
    fn levels_are_sorted_by_elevation() {
        let mut doc = Document::new();
        doc.add_level("Roof", 30.0);
        doc.add_level("Level 2", 12.0);
        doc.add_level("Floor 3", 24.0);
        doc.add_level("Level 1", 0.0);
        doc.add_level("T.O. Parapet", 33.5);

        assert_eq!(
            names(&doc, &all_levels(&doc)),
            ["Level 1", "Level 2", "Floor 3", "Roof", "T.O. Parapet"]
        );
        assert_eq!(
            names(&doc, &floor_level_ids(&doc)),
            ["Level 1", "Level 2", "Floor 3"]
        );
        assert_eq!(names(&doc, &levels_by_name_contains(&doc, "Level")), ["Level 1", "Level 2"]);
        assert_eq!(
            find_by_name_contains(&doc, ElementClass::Level, "Level"),
            level_by_name(&doc, "Level 1")
        );
        assert!(level_by_name(&doc, "level 1").is_none());
    }

    #[test]
    fn lookups_on_empty_document_return_nothing() {
        let doc = Document::new();
        for kind in [ElementClass::Level, ElementClass::Schedule, ElementClass::View] {
            assert!(find_by_name_contains(&doc, kind, "").is_none());
            assert!(find_all_by_name_contains(&doc, kind, "Sheet").is_empty());
            assert!(find_by_exact_name(&doc, kind, "Level 1").is_none());
            assert!(find_all_by_kind(&doc, kind).is_empty());
        }
        assert!(all_schedules(&doc).is_empty());
        assert!(area_scheme_by_name(&doc, "Gross Building").is_none());
        assert!(design_option_by_name(&doc, "Elevation : A").is_none());
    }

    #[test]
    fn schedule_lookups_preserve_document_order() {
        let mut doc = Document::new();
        let first = doc.add_schedule("EX1 - Sheet Index", ScheduleDefinition::new(Category::Sheets, None));
        doc.add_view("Sheet Index Plan", ViewType::FloorPlan);
        let second = doc.add_schedule("EX2 - Sheet Index", ScheduleDefinition::new(Category::Sheets, None));
        let panel = doc.add_schedule("Sheet Index Panel", ScheduleDefinition::new(Category::Sheets, None));
        doc.element_mut(panel)
            .and_then(Element::as_schedule_mut)
            .unwrap()
            .view_type = ViewType::PanelSchedule;

        assert_eq!(schedule_by_name_contains(&doc, "Sheet Index"), Some(first));
        assert_eq!(all_schedules_by_name_contains(&doc, "Sheet Index"), [first, second]);
        assert!(schedule_by_name_contains(&doc, "sheet index").is_none());
        assert_eq!(all_schedules(&doc).len(), 2);
    }

    #[test]
    fn view_lookups_distinguish_plans_and_templates() {
        let mut doc = Document::new();
        let scheme = doc.add_area_scheme("Gross Building");
        let family_type = doc.add_view_family_type("Gross Area Plan", ViewFamily::AreaPlan);
        let floor = doc.add_view("Level 1", ViewType::FloorPlan);
        let plan = doc.add_area_plan("Level 1 - Gross", scheme, Some(family_type));
        let template = doc.add_view_template("Area Plan Template", ViewType::AreaPlan);
        doc.add_view("North Elevation", ViewType::Elevation);

        assert_eq!(all_views(&doc).len(), 4);
        assert_eq!(all_view_plans(&doc), [floor, plan]);
        assert_eq!(all_area_plans(&doc), [plan]);
        assert_eq!(area_plan_by_view_family_name(&doc, "Gross Area Plan"), Some(plan));
        assert!(area_plan_by_view_family_name(&doc, "Rentable Area Plan").is_none());
        assert_eq!(all_view_templates(&doc), [template]);
        assert_eq!(view_template_by_name(&doc, "Area Plan Template"), Some(template));
        assert_eq!(area_scheme_by_name(&doc, "Gross Building"), Some(scheme));
    }

    #[test]
    fn design_options_and_categories_resolve_by_name() {
        let mut doc = Document::new();
        let a = doc.add_design_option("Elevation : A", true);
        let b = doc.add_design_option("Elevation : B", false);
        doc.add_instance("RTU-1", Category::MechanicalEquipment);

        assert_eq!(all_design_options(&doc), [a, b]);
        assert_eq!(design_option_by_name(&doc, "Elevation : B"), Some(b));
        assert_eq!(find_all_in_category(&doc, Category::MechanicalEquipment).len(), 1);
        assert!(find_all_in_category(&doc, Category::Walls).is_empty());
    }
}
