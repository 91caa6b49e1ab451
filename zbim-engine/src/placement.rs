use tracing::{debug, warn};
use zbim_core::element::{ElementClass, ElementId};
use zbim_core::geometry::{Point2, Point3, Vector2, Vector3};
use zbim_core::host::HostDocument;

use crate::errors::EngineError;
use crate::parameters::set_parameter_value;

/// 相邻两次放置之间的固定竖向间距（向下）。
pub const PLACEMENT_STEP: f64 = 8.0;
/// `AreaInfo::ratio` 取此值时不写入比例参数。
pub const NO_RATIO_OVERRIDE: f64 = 99.0;

pub const AREA_CATEGORY_PARAMETER: &str = "Area Category";
pub const COMMENTS_PARAMETER: &str = "Comments";
pub const RATIO_PARAMETER: &str = "150 Ratio";

#[derive(Debug, Clone, PartialEq)]
pub struct AreaInfo {
    pub number: String,
    pub name: String,
    pub category: String,
    pub comments: String,
    pub ratio: f64,
}

impl AreaInfo {
    pub fn new(
        number: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
            category: category.into(),
            comments: String::new(),
            ratio: NO_RATIO_OVERRIDE,
        }
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }

    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    #[inline]
    pub fn ratio_override(&self) -> Option<f64> {
        (self.ratio != NO_RATIO_OVERRIDE).then_some(self.ratio)
    }
}

/// 区域插入点与标记插入点，随每次放置同步下移。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsertionCursor {
    pub area: Point2,
    pub tag: Point3,
}

impl InsertionCursor {
    pub fn new(area: Point2, tag: Point3) -> Self {
        Self { area, tag }
    }

    pub fn advance(&mut self) {
        self.area = self.area.translate(Vector2::new(0.0, -PLACEMENT_STEP));
        self.tag = self.tag.translate(Vector3::new(0.0, -PLACEMENT_STEP, 0.0));
    }
}

impl Default for InsertionCursor {
    fn default() -> Self {
        Self::new(Point2::new(0.0, 0.0), Point3::ORIGIN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedArea {
    pub area: ElementId,
    pub tag: ElementId,
    /// 区域上不存在、因而未能写入的参数名。
    pub missing_parameters: Vec<&'static str>,
}

/// 在游标位置创建一个区域及其标记，写入描述属性后把游标下移一个步长。
pub fn place_area<D: HostDocument>(
    doc: &mut D,
    view: ElementId,
    cursor: &mut InsertionCursor,
    info: &AreaInfo,
) -> Result<PlacedArea, EngineError> {
    let area = doc.create_area(view, cursor.area)?;
    let element = doc
        .element_mut(area)
        .ok_or(EngineError::ElementNotFound(area))?;
    element.name = info.name.clone();
    if let Some(data) = element.as_area_mut() {
        data.number = info.number.clone();
    }

    let mut missing = Vec::new();
    let mut assign = |name: &'static str, applied: bool| {
        if !applied {
            missing.push(name);
        }
    };
    assign(
        AREA_CATEGORY_PARAMETER,
        set_parameter_value(element, AREA_CATEGORY_PARAMETER, info.category.as_str()),
    );
    assign(
        COMMENTS_PARAMETER,
        set_parameter_value(element, COMMENTS_PARAMETER, info.comments.as_str()),
    );
    if let Some(ratio) = info.ratio_override() {
        assign(RATIO_PARAMETER, set_parameter_value(element, RATIO_PARAMETER, ratio));
    }

    let tag = doc.create_area_tag(view, area, cursor.area)?;
    let tag_data = doc
        .element_mut(tag)
        .ok_or(EngineError::ElementNotFound(tag))?
        .as_area_tag_mut()
        .ok_or(EngineError::UnexpectedKind {
            id: tag,
            expected: ElementClass::AreaTag,
        })?;
    tag_data.head = cursor.tag;
    tag_data.has_leader = false;

    if !missing.is_empty() {
        warn!(area = area.get(), ?missing, "区域缺少部分参数，已跳过");
    }
    debug!(
        area = area.get(),
        tag = tag.get(),
        x = cursor.area.x(),
        y = cursor.area.y(),
        "已放置区域及标记"
    );
    cursor.advance();

    Ok(PlacedArea {
        area,
        tag,
        missing_parameters: missing,
    })
}

/// 按顺序放置一组区域，形成等间距的竖向排列。
pub fn place_areas<D: HostDocument>(
    doc: &mut D,
    view: ElementId,
    cursor: &mut InsertionCursor,
    infos: &[AreaInfo],
) -> Result<Vec<PlacedArea>, EngineError> {
    infos
        .iter()
        .map(|info| place_area(doc, view, cursor, info))
        .collect()
}
