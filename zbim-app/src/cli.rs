use anyhow::bail;
use tracing::{info, warn};
use zbim_config::LegendConfig;
use zbim_core::element::Element;
use zbim_core::host::HostDocument;
use zbim_engine::command::{CommandBus, CommandContext, CommandRequest, CommandResponse};
use zbim_engine::query::all_schedules;

use crate::loader::{DocumentSource, LoadedSession};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub command: Option<CommandRequest>,
    pub sheet_filter: String,
    pub legend: LegendConfig,
    pub list_commands: bool,
}

/// 完整流程中放置的示例区域：编号、名称、类别、备注、比例（99 表示不写入）。
const DEMO_AREAS: [[&str; 5]; 3] = [
    ["101", "Living", "Conditioned", "Main floor", "1.0"],
    ["102", "Garage", "Unconditioned", "", "99"],
    ["103", "Porch", "Covered", "Front entry", "0.5"],
];

/// 执行单条命令或完整的立面生成流程，并打印文档概览。
/// 单条命令失败时返回错误；完整流程中的失败步骤只记录告警。
pub fn run(loaded: &mut LoadedSession, options: &RunOptions) -> anyhow::Result<()> {
    let bus = CommandBus::new();
    if options.list_commands {
        let mut commands: Vec<&str> = bus.available_commands().copied().collect();
        commands.sort_unstable();
        println!("支持的命令: {}", commands.join(", "));
        return Ok(());
    }

    print_source(loaded);
    println!("立面标识：{}", loaded.session.designation());

    let mut context = CommandContext {
        session: &mut loaded.session,
    };
    match &options.command {
        Some(request) => {
            let response = bus.dispatch(request, &mut context);
            report(request, &response);
            if !response.success {
                bail!("命令 {} 执行失败", request.name);
            }
        }
        None => {
            let requests = default_sequence(options);
            info!(steps = requests.len(), "执行完整的立面生成流程");
            for request in &requests {
                let response = bus.dispatch(request, &mut context);
                report(request, &response);
                if !response.success {
                    warn!(command = %request.name, "命令执行失败，继续后续步骤");
                }
            }
        }
    }

    print_summary(loaded);
    Ok(())
}

fn default_sequence(options: &RunOptions) -> Vec<CommandRequest> {
    let no_args: [&str; 0] = [];
    let mut requests = vec![
        CommandRequest::new("list_levels", no_args),
        CommandRequest::new("duplicate_equipment_schedule", no_args),
        CommandRequest::new("duplicate_sheet_index", [options.sheet_filter.as_str()]),
        CommandRequest::new("duplicate_veneer_schedule", no_args),
    ];
    requests.extend(
        DEMO_AREAS
            .iter()
            .map(|area| CommandRequest::new("place_area", area.iter().copied())),
    );
    requests.push(CommandRequest::new(
        "attach_area_legend",
        [
            options.legend.area_scheme.as_str(),
            options.legend.color_scheme.as_str(),
        ],
    ));
    requests
}

fn report(request: &CommandRequest, response: &CommandResponse) {
    let status = if response.success { "成功" } else { "失败" };
    match &response.message {
        Some(message) => println!("[{status}] {}: {message}", request.name),
        None => println!("[{status}] {}", request.name),
    }
}

fn print_source(loaded: &LoadedSession) {
    match &loaded.source {
        DocumentSource::Snapshot(path) => {
            println!("已从快照加载文档：{}", path.display());
        }
        DocumentSource::Demo => {
            println!("使用内置示例文档");
            if let Some(ids) = &loaded.demo_elements {
                println!("  - 面积平面 ID = {}", ids.area_plan.get());
                println!("  - 设备明细表 ID = {}", ids.equipment_schedule.get());
                println!("  - 图纸目录 ID = {}", ids.sheet_index.get());
                println!("  - 外饰面明细表 ID = {}", ids.veneer_schedule.get());
            }
        }
    }
}

fn print_summary(loaded: &LoadedSession) {
    let document = loaded.session.document();
    let schedules = all_schedules(document);
    let cursor = loaded.session.cursor();
    info!(
        elements = document.element_count(),
        schedules = schedules.len(),
        "CLI 文档统计"
    );

    println!("文档元素数：{}", document.element_count());
    println!("当前明细表：");
    for name in schedules
        .into_iter()
        .filter_map(|id| document.element(id))
        .map(|element: &Element| element.name.as_str())
    {
        println!("  - {name}");
    }
    println!(
        "下一插入点：区域=({:.2}, {:.2}), 标记=({:.2}, {:.2})",
        cursor.area.x(),
        cursor.area.y(),
        cursor.tag.x(),
        cursor.tag.y()
    );
}
