//! 克隆-配置流水线：定位样板明细表，复制后按立面标识重命名并改写参数与过滤器。
//!
//! 状态依次为 `Locate → Duplicate → Relabel`。找不到样板是正常的空操作结果；
//! 重命名之后的可选步骤（标识参数、过滤器改写）以尽力而为的方式执行，
//! 结果记录在 [`CloneReport`] 中而不是作为错误抛出。

use tracing::{debug, info, warn};
use zbim_core::element::{Element, ElementId};
use zbim_core::host::HostDocument;

use crate::errors::EngineError;
use crate::naming::{ElevationDesignation, elevation_label, relabel_schedule_name};
use crate::parameters::set_parameter_value;
use crate::query::schedule_by_name_contains;

pub const ELEVATION_DESIGNATION_PARAMETER: &str = "Elevation Designation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFamily {
    RoofVentilationEquipment,
    SheetIndex,
    ExteriorVeneerCalculations,
}

impl TemplateFamily {
    /// 样板明细表名称中必须包含的子串。
    pub fn template_substring(self) -> &'static str {
        match self {
            TemplateFamily::RoofVentilationEquipment => "Roof Ventilation Equipment",
            TemplateFamily::SheetIndex => "Sheet Index",
            TemplateFamily::ExteriorVeneerCalculations => "Exterior Veneer Calculations",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ParameterMissing,
    FilterMissing,
    NonStringFilter,
    NotASchedule,
}

/// 可选步骤的执行结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Applied,
    Skipped(SkipReason),
    NotRequested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneReport {
    pub schedule: ElementId,
    pub name: String,
    pub designation_parameter: StepOutcome,
    pub filter: StepOutcome,
}

impl CloneReport {
    /// 所有请求的步骤均已生效。
    pub fn is_complete(&self) -> bool {
        !matches!(self.designation_parameter, StepOutcome::Skipped(_))
            && !matches!(self.filter, StepOutcome::Skipped(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneOutcome {
    NothingToClone,
    Cloned(CloneReport),
}

enum Stage {
    Locate,
    Duplicate(ElementId),
    Relabel(ElementId),
}

#[derive(Debug, Clone)]
pub struct ClonePipeline {
    family: TemplateFamily,
    filter_replacement: Option<String>,
}

impl ClonePipeline {
    pub fn new(family: TemplateFamily) -> Self {
        Self {
            family,
            filter_replacement: None,
        }
    }

    pub fn roof_ventilation_equipment() -> Self {
        Self::new(TemplateFamily::RoofVentilationEquipment)
    }

    /// 图纸索引复制后还会把第 0 个过滤器的字符串值替换为 `filter_value`。
    pub fn sheet_index(filter_value: impl Into<String>) -> Self {
        Self {
            family: TemplateFamily::SheetIndex,
            filter_replacement: Some(filter_value.into()),
        }
    }

    pub fn exterior_veneer_calculations() -> Self {
        Self::new(TemplateFamily::ExteriorVeneerCalculations)
    }

    #[inline]
    pub fn family(&self) -> TemplateFamily {
        self.family
    }

    pub fn run<D: HostDocument>(
        &self,
        doc: &mut D,
        designation: &ElevationDesignation,
    ) -> Result<CloneOutcome, EngineError> {
        let substring = self.family.template_substring();
        let mut stage = Stage::Locate;
        loop {
            stage = match stage {
                Stage::Locate => match schedule_by_name_contains(doc, substring) {
                    Some(template) => Stage::Duplicate(template),
                    None => {
                        info!(template = substring, "未找到样板明细表，跳过复制");
                        return Ok(CloneOutcome::NothingToClone);
                    }
                },
                Stage::Duplicate(template) => {
                    let copy = doc.duplicate_view(template)?;
                    debug!(template = template.get(), copy = copy.get(), "已复制样板明细表");
                    Stage::Relabel(copy)
                }
                Stage::Relabel(copy) => {
                    let element = doc
                        .element_mut(copy)
                        .ok_or(EngineError::ElementNotFound(copy))?;
                    let report = self.relabel(copy, element, designation);
                    info!(
                        schedule = copy.get(),
                        name = %report.name,
                        complete = report.is_complete(),
                        "明细表已按立面标识重命名"
                    );
                    return Ok(CloneOutcome::Cloned(report));
                }
            };
        }
    }

    fn relabel(
        &self,
        id: ElementId,
        element: &mut Element,
        designation: &ElevationDesignation,
    ) -> CloneReport {
        let name = relabel_schedule_name(&element.name, designation);
        element.name = name.clone();

        let designation_parameter = if set_parameter_value(
            element,
            ELEVATION_DESIGNATION_PARAMETER,
            elevation_label(designation),
        ) {
            StepOutcome::Applied
        } else {
            warn!(schedule = id.get(), "明细表缺少立面标识参数");
            StepOutcome::Skipped(SkipReason::ParameterMissing)
        };

        let filter = match &self.filter_replacement {
            Some(value) => rewrite_first_filter(element, value),
            None => StepOutcome::NotRequested,
        };
        if let StepOutcome::Skipped(reason) = filter {
            warn!(schedule = id.get(), ?reason, "未改写明细表过滤器");
        }

        CloneReport {
            schedule: id,
            name,
            designation_parameter,
            filter,
        }
    }
}

fn rewrite_first_filter(element: &mut Element, value: &str) -> StepOutcome {
    let Some(schedule) = element.as_schedule_mut() else {
        return StepOutcome::Skipped(SkipReason::NotASchedule);
    };
    let Some(mut filter) = schedule.definition.filter(0) else {
        return StepOutcome::Skipped(SkipReason::FilterMissing);
    };
    if !filter.is_string_value() {
        return StepOutcome::Skipped(SkipReason::NonStringFilter);
    }
    filter.set_value(value);
    schedule.definition.set_filter(0, filter);
    StepOutcome::Applied
}

/// 三类样板的标准流水线，图纸索引使用给定的过滤值。
pub fn standard_pipelines(sheet_filter: &str) -> [ClonePipeline; 3] {
    [
        ClonePipeline::roof_ventilation_equipment(),
        ClonePipeline::sheet_index(sheet_filter),
        ClonePipeline::exterior_veneer_calculations(),
    ]
}

/// 依次运行多条流水线，任一宿主错误立即中止。
pub fn run_all<D: HostDocument>(
    doc: &mut D,
    pipelines: &[ClonePipeline],
    designation: &ElevationDesignation,
) -> Result<Vec<(TemplateFamily, CloneOutcome)>, EngineError> {
    pipelines
        .iter()
        .map(|pipeline| -> Result<_, EngineError> {
            Ok((pipeline.family(), pipeline.run(doc, designation)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use zbim_core::document::Document;
    use zbim_core::element::{Category, FilterType, FilterValue, ScheduleDefinition, ScheduleFilter};

    use super::*;

    fn sheet_index_definition(filter: ScheduleFilter) -> ScheduleDefinition {
        let mut definition = ScheduleDefinition::new(Category::Sheets, None);
        definition.add_filter(filter);
        definition
    }

    #[test]
    fn sheet_index_clone_is_renamed_and_refiltered() {
        let mut doc = Document::new();
        doc.add_project_parameter(ELEVATION_DESIGNATION_PARAMETER, [Category::Schedules]);
        let template = doc.add_schedule(
            "EX1 - Sheet Index",
            sheet_index_definition(ScheduleFilter::new(0, FilterType::Equal, "A")),
        );

        let outcome = ClonePipeline::sheet_index("B")
            .run(&mut doc, &ElevationDesignation::new("B"))
            .expect("pipeline runs");
        let CloneOutcome::Cloned(report) = outcome else {
            panic!("expected a clone, got {outcome:?}");
        };

        assert_eq!(report.name, "EX1 - Elevation B");
        assert_eq!(report.designation_parameter, StepOutcome::Applied);
        assert_eq!(report.filter, StepOutcome::Applied);
        assert!(report.is_complete());

        let copy = doc.element(report.schedule).unwrap();
        assert_eq!(copy.name, "EX1 - Elevation B");
        let designation = copy
            .parameters
            .iter()
            .find(|p| p.name == ELEVATION_DESIGNATION_PARAMETER)
            .unwrap();
        assert_eq!(designation.value.as_str(), Some("Elevation B"));
        let filter = &copy.as_schedule().unwrap().definition.filters()[0];
        assert_eq!(filter.value(), &FilterValue::from("B"));

        let original = doc.element(template).unwrap();
        assert_eq!(original.name, "EX1 - Sheet Index");
        assert_eq!(
            original.as_schedule().unwrap().definition.filters()[0].value(),
            &FilterValue::from("A")
        );
    }

    #[test]
    fn missing_template_is_a_no_op() {
        let mut doc = Document::new();
        doc.add_schedule("Door Schedule", ScheduleDefinition::new(Category::GenericModels, None));
        let before = doc.element_count();

        for pipeline in standard_pipelines("B") {
            let outcome = pipeline
                .run(&mut doc, &ElevationDesignation::new("B"))
                .expect("pipeline runs");
            assert_eq!(outcome, CloneOutcome::NothingToClone);
        }
        assert_eq!(doc.element_count(), before);
    }

    #[test]
    fn optional_steps_are_best_effort() {
        let mut doc = Document::new();
        doc.add_schedule(
            "EX2 - Sheet Index",
            sheet_index_definition(ScheduleFilter::new(0, FilterType::GreaterThan, 2_i64)),
        );

        let outcome = ClonePipeline::sheet_index("C")
            .run(&mut doc, &ElevationDesignation::new("C"))
            .expect("pipeline runs");
        let CloneOutcome::Cloned(report) = outcome else {
            panic!("expected a clone");
        };
        assert_eq!(report.name, "EX2 - Elevation C");
        assert_eq!(
            report.designation_parameter,
            StepOutcome::Skipped(SkipReason::ParameterMissing)
        );
        assert_eq!(report.filter, StepOutcome::Skipped(SkipReason::NonStringFilter));
        assert!(!report.is_complete());

        let copy = doc.element(report.schedule).unwrap();
        assert_eq!(
            copy.as_schedule().unwrap().definition.filters()[0].value(),
            &FilterValue::Integer(2)
        );
    }

    #[test]
    fn families_without_filter_step_report_not_requested() {
        let mut doc = Document::new();
        doc.add_project_parameter(ELEVATION_DESIGNATION_PARAMETER, [Category::Schedules]);
        doc.add_schedule(
            "Exterior Veneer Calculations - Elevation A",
            ScheduleDefinition::new(Category::Walls, None),
        );
        doc.add_schedule("EX1 - Sheet Index", ScheduleDefinition::new(Category::Sheets, None));

        let results = run_all(
            &mut doc,
            &standard_pipelines("D"),
            &ElevationDesignation::new("D"),
        )
        .expect("pipelines run");

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], (TemplateFamily::RoofVentilationEquipment, CloneOutcome::NothingToClone));

        let (family, CloneOutcome::Cloned(sheet)) = &results[1] else {
            panic!("sheet index should be cloned");
        };
        assert_eq!(*family, TemplateFamily::SheetIndex);
        assert_eq!(sheet.filter, StepOutcome::Skipped(SkipReason::FilterMissing));

        let (_, CloneOutcome::Cloned(veneer)) = &results[2] else {
            panic!("veneer schedule should be cloned");
        };
        assert_eq!(veneer.name, "Exterior Veneer Calculations - Elevation D");
        assert_eq!(veneer.filter, StepOutcome::NotRequested);
        assert!(veneer.is_complete());
    }
}
