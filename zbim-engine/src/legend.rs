use tracing::{debug, warn};
use zbim_core::element::{Category, ElementClass, ElementId};
use zbim_core::geometry::Point3;
use zbim_core::host::HostDocument;

use crate::errors::EngineError;

/// 按名称与所属面积方案查找颜色填充方案；零个或多个匹配都视为未找到。
pub fn color_fill_scheme_by_name<D: HostDocument>(
    doc: &D,
    name: &str,
    area_scheme: ElementId,
) -> Option<ElementId> {
    let mut matches = doc
        .elements()
        .filter(|(_, element)| {
            element.name == name
                && element
                    .as_color_fill_scheme()
                    .is_some_and(|scheme| scheme.area_scheme == area_scheme)
        })
        .map(|(id, _)| id);
    let first = matches.next()?;
    if matches.next().is_some() {
        warn!(name, area_scheme = area_scheme.get(), "颜色填充方案名称不唯一");
        return None;
    }
    Some(first)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendOutcome {
    /// 本次调用是否绑定了新的方案；视图已有方案时为 `false`。
    pub scheme_bound: bool,
    pub legend: ElementId,
}

/// 视图在面积类别上尚无方案时绑定 `scheme`，随后总是在原点新建一个图例。
/// 重复调用会产生重复图例。
pub fn attach_legend<D: HostDocument>(
    doc: &mut D,
    view: ElementId,
    scheme: ElementId,
) -> Result<LegendOutcome, EngineError> {
    let target = doc
        .element_mut(view)
        .ok_or(EngineError::ElementNotFound(view))?
        .as_view_mut()
        .ok_or(EngineError::UnexpectedKind {
            id: view,
            expected: ElementClass::View,
        })?;

    let scheme_bound = target.color_fill_scheme(Category::Areas).is_none();
    if scheme_bound {
        target.set_color_fill_scheme(Category::Areas, scheme);
    }

    let legend = doc.create_color_fill_legend(view, Category::Areas, Point3::ORIGIN)?;
    debug!(view = view.get(), legend = legend.get(), scheme_bound, "已添加颜色填充图例");
    Ok(LegendOutcome {
        scheme_bound,
        legend,
    })
}

#[cfg(test)]
mod tests {
    use zbim_core::document::Document;

    use super::*;

    #[test]
    fn scheme_lookup_requires_unique_match_within_area_scheme() {
        let mut doc = Document::new();
        let gross = doc.add_area_scheme("Gross Building");
        let rentable = doc.add_area_scheme("Rentable");
        let fill = doc.add_color_fill_scheme("Area Category", Category::Areas, gross);
        doc.add_color_fill_scheme("Area Category", Category::Areas, rentable);
        doc.add_color_fill_scheme("Name", Category::Areas, rentable);
        doc.add_color_fill_scheme("Name", Category::Areas, rentable);

        assert_eq!(color_fill_scheme_by_name(&doc, "Area Category", gross), Some(fill));
        assert!(color_fill_scheme_by_name(&doc, "Name", gross).is_none());
        assert!(color_fill_scheme_by_name(&doc, "Name", rentable).is_none());
        assert!(color_fill_scheme_by_name(&doc, "area category", gross).is_none());
    }

    #[test]
    fn repeated_attach_binds_once_and_duplicates_legends() {
        let mut doc = Document::new();
        let scheme = doc.add_area_scheme("Gross Building");
        let plan = doc.add_area_plan("Level 1 - Gross", scheme, None);
        let fill = doc.add_color_fill_scheme("Area Category", Category::Areas, scheme);

        let first = attach_legend(&mut doc, plan, fill).expect("first attach");
        let second = attach_legend(&mut doc, plan, fill).expect("second attach");

        assert!(first.scheme_bound);
        assert!(!second.scheme_bound);
        assert_ne!(first.legend, second.legend);

        let view = doc.element(plan).unwrap().as_view().unwrap();
        assert_eq!(view.color_fill_scheme(Category::Areas), Some(fill));
        let legends: Vec<_> = doc
            .elements()
            .filter_map(|(_, element)| element.as_color_fill_legend())
            .collect();
        assert_eq!(legends.len(), 2);
        assert!(legends.iter().all(|legend| legend.view == plan && legend.origin == Point3::ORIGIN));
    }

    #[test]
    fn existing_binding_is_left_in_place() {
        let mut doc = Document::new();
        let scheme = doc.add_area_scheme("Gross Building");
        let plan = doc.add_area_plan("Level 1 - Gross", scheme, None);
        let existing = doc.add_color_fill_scheme("Name", Category::Areas, scheme);
        let fill = doc.add_color_fill_scheme("Area Category", Category::Areas, scheme);
        attach_legend(&mut doc, plan, existing).expect("bind existing");

        let outcome = attach_legend(&mut doc, plan, fill).expect("attach");
        assert!(!outcome.scheme_bound);
        let view = doc.element(plan).unwrap().as_view().unwrap();
        assert_eq!(view.color_fill_scheme(Category::Areas), Some(existing));

        let level = doc.add_level("Level 1", 0.0);
        assert!(matches!(
            attach_legend(&mut doc, level, fill),
            Err(EngineError::UnexpectedKind { .. })
        ));
    }
}
