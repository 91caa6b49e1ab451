use tracing::debug;
use zbim_core::document::Document;
use zbim_core::element::{
    BuiltInParameter, Category, ElementId, FieldType, FilterType, ParameterId, ScheduleDefinition,
    ScheduleField, ScheduleFilter, ViewFamily,
};

use crate::naming::ElevationDesignation;
use crate::pipeline::ELEVATION_DESIGNATION_PARAMETER;
use crate::placement::{AREA_CATEGORY_PARAMETER, InsertionCursor, RATIO_PARAMETER};

/// 一次生成运行的外部状态：宿主文档、当前立面标识与插入游标。
#[derive(Debug)]
pub struct Session {
    document: Document,
    designation: ElevationDesignation,
    cursor: InsertionCursor,
}

#[derive(Debug, Clone, Copy)]
pub struct DemoElements {
    pub area_scheme: ElementId,
    pub area_plan: ElementId,
    pub color_scheme: ElementId,
    pub equipment_schedule: ElementId,
    pub sheet_index: ElementId,
    pub veneer_schedule: ElementId,
}

impl Session {
    pub fn new(designation: ElevationDesignation) -> Self {
        Self {
            document: Document::new(),
            designation,
            cursor: InsertionCursor::default(),
        }
    }

    pub fn with_document(document: Document, designation: ElevationDesignation) -> Self {
        let mut session = Self::new(designation);
        session.load_document(document);
        session
    }

    /// 替换当前文档并重置游标。
    pub fn load_document(&mut self, document: Document) {
        self.document = document;
        self.cursor = InsertionCursor::default();
    }

    #[inline]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[inline]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    #[inline]
    pub fn designation(&self) -> &ElevationDesignation {
        &self.designation
    }

    pub fn set_designation(&mut self, designation: ElevationDesignation) {
        self.designation = designation;
    }

    #[inline]
    pub fn cursor(&self) -> InsertionCursor {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: InsertionCursor) {
        self.cursor = cursor;
    }

    /// 同时借出文档与游标，供放置引擎逐次推进。
    pub fn document_and_cursor(&mut self) -> (&mut Document, &mut InsertionCursor) {
        (&mut self.document, &mut self.cursor)
    }

    /// 为 CLI / 快速验证填充一份立面 A 的示例文档，返回关键元素 ID。
    pub fn populate_demo(&mut self) -> DemoElements {
        let doc = &mut self.document;

        doc.add_level("Level 2", 10.0);
        doc.add_level("Roof", 25.0);
        doc.add_level("Level 1", 0.0);
        doc.add_level("Floor 3", 20.0);
        doc.add_design_option("Elevation : A", true);
        doc.add_design_option("Elevation : B", false);

        doc.add_project_parameter(ELEVATION_DESIGNATION_PARAMETER, [Category::Schedules]);
        doc.add_project_parameter(AREA_CATEGORY_PARAMETER, [Category::Areas]);
        doc.add_project_parameter(RATIO_PARAMETER, [Category::Areas]);

        let area_scheme = doc.add_area_scheme("Gross Building");
        let plan_type = doc.add_view_family_type("Area Plan", ViewFamily::AreaPlan);
        let area_plan = doc.add_area_plan("Level 1 - Gross Area", area_scheme, Some(plan_type));
        let color_scheme = doc.add_color_fill_scheme("Area Category", Category::Areas, area_scheme);

        doc.add_instance("RTU-1", Category::MechanicalEquipment);
        doc.add_instance("EF-1", Category::MechanicalEquipment);
        doc.add_instance("A-101", Category::Sheets);

        let mark = ParameterId::BuiltIn(BuiltInParameter::Mark);
        let comments = ParameterId::BuiltIn(BuiltInParameter::Comments);
        let field = |parameter| ScheduleField {
            parameter,
            field_type: FieldType::Instance,
        };

        let mut equipment = ScheduleDefinition::new(Category::MechanicalEquipment, None);
        equipment.add_field(field(mark));
        equipment.add_field(field(comments));
        let equipment_schedule = doc.add_schedule("Roof Ventilation Equipment - Elevation A", equipment);

        let mut sheets = ScheduleDefinition::new(Category::Sheets, None);
        let code = sheets.add_field(field(mark));
        sheets.add_filter(ScheduleFilter::new(code, FilterType::Contains, "A"));
        let sheet_index = doc.add_schedule("Sheet Index - Elevation A", sheets);

        let mut veneer = ScheduleDefinition::new(Category::Walls, None);
        veneer.add_field(field(comments));
        let veneer_schedule = doc.add_schedule("Exterior Veneer Calculations - Elevation A", veneer);

        let ids = DemoElements {
            area_scheme,
            area_plan,
            color_scheme,
            equipment_schedule,
            sheet_index,
            veneer_schedule,
        };

        debug!(
            area_plan = ids.area_plan.get(),
            equipment_schedule = ids.equipment_schedule.get(),
            sheet_index = ids.sheet_index.get(),
            veneer_schedule = ids.veneer_schedule.get(),
            "已创建演示元素"
        );

        ids
    }
}
