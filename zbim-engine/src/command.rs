use std::collections::HashMap;

use zbim_core::element::{Category, Element};
use zbim_core::host::HostDocument;

use crate::legend::{attach_legend, color_fill_scheme_by_name};
use crate::parameters::resolve_parameter_ids;
use crate::pipeline::{CloneOutcome, ClonePipeline, TemplateFamily};
use crate::placement::{
    AREA_CATEGORY_PARAMETER, AreaInfo, COMMENTS_PARAMETER, RATIO_PARAMETER, place_area,
};
use crate::query::{all_area_plans, area_scheme_by_name, floor_level_ids};
use crate::schedule::{add_fields, create_area_schedule};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse;
}

pub struct CommandContext<'a> {
    pub session: &'a mut Session,
}

pub struct CommandBus {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        let mut bus = Self {
            handlers: HashMap::new(),
        };
        bus.register(DuplicateScheduleCommand {
            name: "duplicate_equipment_schedule",
            family: TemplateFamily::RoofVentilationEquipment,
        });
        bus.register(DuplicateScheduleCommand {
            name: "duplicate_sheet_index",
            family: TemplateFamily::SheetIndex,
        });
        bus.register(DuplicateScheduleCommand {
            name: "duplicate_veneer_schedule",
            family: TemplateFamily::ExteriorVeneerCalculations,
        });
        bus.register(PlaceAreaCommand);
        bus.register(AttachAreaLegendCommand);
        bus.register(CreateAreaScheduleCommand);
        bus.register(ListLevelsCommand);
        bus
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.name(), Box::new(handler));
    }

    pub fn dispatch(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        if let Some(handler) = self.handlers.get(request.name.as_str()) {
            handler.execute(request, context)
        } else {
            CommandResponse::err(format!("未知命令: {}", request.name))
        }
    }

    pub fn available_commands(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

struct DuplicateScheduleCommand {
    name: &'static str,
    family: TemplateFamily,
}

impl CommandHandler for DuplicateScheduleCommand {
    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let pipeline = match self.family {
            TemplateFamily::SheetIndex => match request.arg(0) {
                Some(filter) => ClonePipeline::sheet_index(filter),
                None => return CommandResponse::err("duplicate_sheet_index 需要过滤值参数"),
            },
            family => ClonePipeline::new(family),
        };

        let designation = context.session.designation().clone();
        match pipeline.run(context.session.document_mut(), &designation) {
            Ok(CloneOutcome::NothingToClone) => CommandResponse::ok(format!(
                "未找到名称包含 \"{}\" 的明细表，无需复制",
                self.family.template_substring()
            )),
            Ok(CloneOutcome::Cloned(report)) if report.is_complete() => {
                CommandResponse::ok(format!("已生成明细表：{}", report.name))
            }
            Ok(CloneOutcome::Cloned(report)) => CommandResponse::ok(format!(
                "已生成明细表：{}（部分步骤跳过：参数={:?}, 过滤器={:?}）",
                report.name, report.designation_parameter, report.filter
            )),
            Err(err) => CommandResponse::err(format!("复制明细表失败: {err}")),
        }
    }
}

struct PlaceAreaCommand;

impl CommandHandler for PlaceAreaCommand {
    fn name(&self) -> &'static str {
        "place_area"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let (Some(number), Some(name), Some(category)) =
            (request.arg(0), request.arg(1), request.arg(2))
        else {
            return CommandResponse::err("place_area 需要参数: 编号 名称 类别 [备注] [比例]");
        };
        let mut info = AreaInfo::new(number, name, category);
        if let Some(comments) = request.arg(3) {
            info = info.with_comments(comments);
        }
        if let Some(raw) = request.arg(4) {
            match raw.parse::<f64>() {
                Ok(ratio) => info = info.with_ratio(ratio),
                Err(_) => return CommandResponse::err(format!("无效的比例值: {raw}")),
            }
        }

        let Some(plan) = all_area_plans(context.session.document()).first().copied() else {
            return CommandResponse::err("文档中没有面积平面");
        };
        let (document, cursor) = context.session.document_and_cursor();
        match place_area(document, plan, cursor, &info) {
            Ok(placed) if placed.missing_parameters.is_empty() => {
                CommandResponse::ok(format!("已放置区域 {} {}", info.number, info.name))
            }
            Ok(placed) => CommandResponse::ok(format!(
                "已放置区域 {} {}（缺少参数: {}）",
                info.number,
                info.name,
                placed.missing_parameters.join(", ")
            )),
            Err(err) => CommandResponse::err(format!("放置区域失败: {err}")),
        }
    }
}

struct AttachAreaLegendCommand;

impl CommandHandler for AttachAreaLegendCommand {
    fn name(&self) -> &'static str {
        "attach_area_legend"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let (Some(scheme_name), Some(color_name)) = (request.arg(0), request.arg(1)) else {
            return CommandResponse::err("attach_area_legend 需要参数: 面积方案 颜色方案");
        };
        let document = context.session.document_mut();
        let Some(area_scheme) = area_scheme_by_name(&*document, scheme_name) else {
            return CommandResponse::err(format!("未找到面积方案: {scheme_name}"));
        };
        let Some(color_scheme) = color_fill_scheme_by_name(&*document, color_name, area_scheme)
        else {
            return CommandResponse::err(format!("未找到唯一的颜色填充方案: {color_name}"));
        };
        let view = all_area_plans(&*document).into_iter().find(|id| {
            document
                .element(*id)
                .and_then(Element::as_view)
                .is_some_and(|view| view.area_scheme == Some(area_scheme))
        });
        let Some(view) = view else {
            return CommandResponse::err(format!("面积方案 {scheme_name} 没有对应的面积平面"));
        };

        match attach_legend(document, view, color_scheme) {
            Ok(outcome) if outcome.scheme_bound => {
                CommandResponse::ok(format!("已绑定 {color_name} 并添加图例"))
            }
            Ok(_) => CommandResponse::ok("视图已有颜色方案，已添加图例"),
            Err(err) => CommandResponse::err(format!("添加图例失败: {err}")),
        }
    }
}

struct CreateAreaScheduleCommand;

impl CommandHandler for CreateAreaScheduleCommand {
    fn name(&self) -> &'static str {
        "create_area_schedule"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let (Some(name), Some(scheme_name)) = (request.arg(0), request.arg(1)) else {
            return CommandResponse::err("create_area_schedule 需要参数: 名称 面积方案");
        };
        let document = context.session.document_mut();
        let Some(area_scheme) = area_scheme_by_name(&*document, scheme_name) else {
            return CommandResponse::err(format!("未找到面积方案: {scheme_name}"));
        };
        let fields = match resolve_parameter_ids(
            &*document,
            Category::Areas,
            &[AREA_CATEGORY_PARAMETER, COMMENTS_PARAMETER, RATIO_PARAMETER],
        ) {
            Ok(fields) => fields,
            Err(err) => return CommandResponse::err(format!("无法解析明细表字段: {err}")),
        };

        let result = create_area_schedule(document, name, area_scheme)
            .and_then(|schedule| add_fields(document, schedule, &fields));
        match result {
            Ok(()) => CommandResponse::ok(format!("已创建面积明细表 {name}（{} 个字段）", fields.len())),
            Err(err) => CommandResponse::err(format!("创建面积明细表失败: {err}")),
        }
    }
}

struct ListLevelsCommand;

impl CommandHandler for ListLevelsCommand {
    fn name(&self) -> &'static str {
        "list_levels"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let document = context.session.document();
        let names: Vec<&str> = floor_level_ids(document)
            .into_iter()
            .filter_map(|id| document.element(id))
            .map(|element| element.name.as_str())
            .collect();
        CommandResponse::ok(format!("楼层标高（自下而上）: {}", names.join(", ")))
    }
}
