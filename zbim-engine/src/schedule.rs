use tracing::debug;
use zbim_core::element::{
    Category, ElementClass, ElementId, FieldType, ParameterId, ScheduleField,
};
use zbim_core::host::HostDocument;

use crate::errors::EngineError;

fn rename<D: HostDocument>(doc: &mut D, id: ElementId, name: &str) -> Result<(), EngineError> {
    let element = doc.element_mut(id).ok_or(EngineError::ElementNotFound(id))?;
    element.name = name.to_string();
    Ok(())
}

/// 新建绑定到类别的明细表并命名。
pub fn create_schedule<D: HostDocument>(
    doc: &mut D,
    category: Category,
    name: &str,
) -> Result<ElementId, EngineError> {
    let id = doc.create_schedule(category, None)?;
    rename(doc, id, name)?;
    debug!(id = id.get(), name, "已创建明细表");
    Ok(id)
}

/// 新建面积明细表，额外限定到某个面积方案。
pub fn create_area_schedule<D: HostDocument>(
    doc: &mut D,
    name: &str,
    area_scheme: ElementId,
) -> Result<ElementId, EngineError> {
    let id = doc.create_schedule(Category::Areas, Some(area_scheme))?;
    rename(doc, id, name)?;
    debug!(id = id.get(), name, area_scheme = area_scheme.get(), "已创建面积明细表");
    Ok(id)
}

/// 按调用顺序为每个参数追加一个实例字段，列顺序即输入顺序。
/// 重复调用会产生重复列。
pub fn add_fields<D: HostDocument>(
    doc: &mut D,
    schedule: ElementId,
    parameters: &[ParameterId],
) -> Result<(), EngineError> {
    let view = doc
        .element_mut(schedule)
        .ok_or(EngineError::ElementNotFound(schedule))?
        .as_schedule_mut()
        .ok_or(EngineError::UnexpectedKind {
            id: schedule,
            expected: ElementClass::Schedule,
        })?;
    for parameter in parameters {
        view.definition.add_field(ScheduleField {
            parameter: *parameter,
            field_type: FieldType::Instance,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use zbim_core::document::Document;
    use zbim_core::element::BuiltInParameter;

    use super::*;

    #[test]
    fn fields_follow_caller_order() {
        let mut doc = Document::new();
        let elevation = doc.add_project_parameter("Elevation Designation", [Category::MechanicalEquipment]);
        let schedule = create_schedule(&mut doc, Category::MechanicalEquipment, "Roof Ventilation Equipment")
            .expect("create schedule");

        let fields = [
            ParameterId::BuiltIn(BuiltInParameter::Mark),
            ParameterId::Project(elevation),
            ParameterId::BuiltIn(BuiltInParameter::Comments),
        ];
        add_fields(&mut doc, schedule, &fields).expect("add fields");
        add_fields(&mut doc, schedule, &fields[..1]).expect("add duplicate field");

        let element = doc.element(schedule).unwrap();
        assert_eq!(element.name, "Roof Ventilation Equipment");
        let definition = &element.as_schedule().unwrap().definition;
        let bound: Vec<ParameterId> = definition.fields().iter().map(|f| f.parameter).collect();
        assert_eq!(bound, [fields[0], fields[1], fields[2], fields[0]]);
        assert!(definition.fields().iter().all(|f| f.field_type == FieldType::Instance));
        assert_eq!(definition.category, Category::MechanicalEquipment);
    }

    #[test]
    fn area_schedule_is_scoped_to_scheme() {
        let mut doc = Document::new();
        let scheme = doc.add_area_scheme("Gross Building");
        let schedule = create_area_schedule(&mut doc, "Floor Areas - Elevation A", scheme)
            .expect("create area schedule");

        let element = doc.element(schedule).unwrap();
        assert_eq!(element.name, "Floor Areas - Elevation A");
        let definition = &element.as_schedule().unwrap().definition;
        assert_eq!(definition.category, Category::Areas);
        assert_eq!(definition.area_scheme, Some(scheme));

        let level = doc.add_level("Level 1", 0.0);
        assert!(matches!(
            add_fields(&mut doc, level, &[]),
            Err(EngineError::UnexpectedKind { .. })
        ));
        assert!(matches!(
            create_area_schedule(&mut doc, "Bad", level),
            Err(EngineError::Host(_))
        ));
    }
}
