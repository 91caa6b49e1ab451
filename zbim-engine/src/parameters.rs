use tracing::debug;
use zbim_core::element::{
    BuiltInParameter, Category, Element, ElementClass, ElementId, Parameter, ParameterId,
    ParameterValue,
};
use zbim_core::host::HostDocument;

use crate::errors::EngineError;
use crate::query::{find_all_in_category, find_by_exact_name};

/// 按定义名查找元素自身的参数，重名时取第一个。
pub fn parameter<'a>(element: &'a Element, name: &str) -> Option<&'a Parameter> {
    element.parameters.iter().find(|p| p.name == name)
}

pub fn parameter_mut<'a>(element: &'a mut Element, name: &str) -> Option<&'a mut Parameter> {
    element.parameters.iter_mut().find(|p| p.name == name)
}

/// 写入参数值。参数不存在时返回 `false` 且不修改元素；不校验值类型。
pub fn set_parameter_value(
    element: &mut Element,
    name: &str,
    value: impl Into<ParameterValue>,
) -> bool {
    match parameter_mut(element, name) {
        Some(parameter) => {
            parameter.value = value.into();
            true
        }
        None => false,
    }
}

pub fn set_element_parameter<D: HostDocument>(
    doc: &mut D,
    id: ElementId,
    name: &str,
    value: impl Into<ParameterValue>,
) -> bool {
    doc.element_mut(id)
        .is_some_and(|element| set_parameter_value(element, name, value))
}

fn first_in_category<D: HostDocument>(doc: &D, category: Category) -> Result<&Element, EngineError> {
    find_all_in_category(doc, category)
        .first()
        .and_then(|id| doc.element(*id))
        .ok_or(EngineError::EmptyCategory(category))
}

/// 以类别中第一个元素为样本解析参数标识，用于构建明细表字段。
///
/// 样本元素缺少的名称会被跳过，即使同类别的其他元素带有该参数。
pub fn resolve_parameter_ids<D: HostDocument>(
    doc: &D,
    category: Category,
    names: &[&str],
) -> Result<Vec<ParameterId>, EngineError> {
    let sample = first_in_category(doc, category)?;
    let resolved: Vec<ParameterId> = names
        .iter()
        .filter_map(|name| parameter(sample, name).map(|p| p.id))
        .collect();
    if resolved.len() < names.len() {
        debug!(
            category = category.display_name(),
            requested = names.len(),
            resolved = resolved.len(),
            "样本元素缺少部分参数"
        );
    }
    Ok(resolved)
}

pub fn resolve_builtin_parameter_id<D: HostDocument>(
    doc: &D,
    category: Category,
    builtin: BuiltInParameter,
) -> Result<Option<ParameterId>, EngineError> {
    let sample = first_in_category(doc, category)?;
    let wanted = ParameterId::BuiltIn(builtin);
    Ok(sample
        .parameters
        .iter()
        .find(|p| p.id == wanted)
        .map(|p| p.id))
}

pub fn project_parameter_id<D: HostDocument>(doc: &D, name: &str) -> Option<ElementId> {
    find_by_exact_name(doc, ElementClass::ParameterElement, name)
}
