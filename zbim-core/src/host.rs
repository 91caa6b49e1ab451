use thiserror::Error;

use crate::element::{Category, Element, ElementClass, ElementId};
use crate::geometry::{Point2, Point3};

#[derive(Debug, Error, PartialEq)]
pub enum HostError {
    #[error("element {0} not found")]
    ElementNotFound(ElementId),
    #[error("element {id} is a {actual:?}, expected {expected:?}")]
    UnexpectedKind {
        id: ElementId,
        expected: ElementClass,
        actual: ElementClass,
    },
    #[error("element {0} is not a view and cannot be duplicated")]
    CannotDuplicate(ElementId),
    #[error("view {0} is not an area plan")]
    NotAreaPlan(ElementId),
    #[error("area scheme schedules require the Areas category, got {0:?}")]
    AreaSchemeCategory(Category),
    #[error("view {view} has no color fill scheme bound for {category:?}")]
    NoColorFillScheme { view: ElementId, category: Category },
    #[error("element id {0} appears more than once")]
    DuplicateElementId(ElementId),
}

/// 宿主文档的能力接口。查询与流水线只依赖这些原语，
/// 元素的持久化、事务与撤销由宿主负责。
pub trait HostDocument {
    /// 以存储顺序枚举全部元素，顺序不作保证。
    fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)>;

    fn element(&self, id: ElementId) -> Option<&Element>;

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element>;

    /// 完整复制视图或明细表，复制语义由宿主决定。
    fn duplicate_view(&mut self, id: ElementId) -> Result<ElementId, HostError>;

    fn create_schedule(
        &mut self,
        category: Category,
        area_scheme: Option<ElementId>,
    ) -> Result<ElementId, HostError>;

    fn create_area(&mut self, view: ElementId, point: Point2) -> Result<ElementId, HostError>;

    fn create_area_tag(
        &mut self,
        view: ElementId,
        area: ElementId,
        point: Point2,
    ) -> Result<ElementId, HostError>;

    fn create_color_fill_legend(
        &mut self,
        view: ElementId,
        category: Category,
        origin: Point3,
    ) -> Result<ElementId, HostError>;

    fn element_count(&self) -> usize {
        self.elements().count()
    }
}
