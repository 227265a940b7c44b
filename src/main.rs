// ==========================================
// 产能损失决策系统 - 命令行入口
// ==========================================
// 用法:
//   capacity-loss-aps evaluate --plan <文件> --inventory <文件> \
//       --date <YYYY-MM-DD> --shift <T1..T4> --line <产线> --part <料号> \
//       --lost <已损失产量> --repair-hours <剩余修理时间> \
//       [--year <年份>] [--db <数据库>] [--record]
//   capacity-loss-aps config-show [--db <数据库>]
//   capacity-loss-aps config-set <key> <value> [--db <数据库>]
//   capacity-loss-aps audits [--limit <条数>] [--db <数据库>]
//
// 决策结果以 JSON 输出到 stdout; 日志输出到 stderr
// ==========================================

use capacity_loss_aps::api::DisruptionApi;
use capacity_loss_aps::db::get_default_db_path;
use capacity_loss_aps::domain::{LossEvent, ShiftCode};
use capacity_loss_aps::importer::{InventoryImporter, PlanImporter};
use chrono::{Datelike, Local, NaiveDate};
use std::collections::HashMap;
use std::error::Error;

const USAGE: &str = "用法: capacity-loss-aps <evaluate|config-show|config-set|audits> [参数]";

/// 简单参数表: --key value / --flag
struct CliArgs {
    positional: Vec<String>,
    options: HashMap<String, String>,
    flags: Vec<String>,
}

impl CliArgs {
    fn parse<I: Iterator<Item = String>>(args: I) -> Self {
        let mut positional = Vec::new();
        let mut options = HashMap::new();
        let mut flags = Vec::new();
        let mut args = args.peekable();

        while let Some(arg) = args.next() {
            match arg.strip_prefix("--") {
                Some(name) => match args.peek() {
                    Some(next) if !next.starts_with("--") => {
                        let value = args.next().unwrap_or_default();
                        options.insert(name.to_string(), value);
                    }
                    _ => flags.push(name.to_string()),
                },
                None => positional.push(arg),
            }
        }

        Self {
            positional,
            options,
            flags,
        }
    }

    fn required(&self, name: &str) -> Result<&str, Box<dyn Error>> {
        self.options
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| format!("缺少参数 --{}", name).into())
    }

    fn number(&self, name: &str) -> Result<f64, Box<dyn Error>> {
        let raw = self.required(name)?;
        raw.trim()
            .parse::<f64>()
            .map_err(|_| format!("参数 --{} 不是数值: {}", name, raw).into())
    }

    fn has_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f == name)
    }

    fn db_path(&self) -> String {
        self.options
            .get("db")
            .cloned()
            .unwrap_or_else(get_default_db_path)
    }
}

fn main() {
    capacity_loss_aps::logging::init();

    if let Err(e) = run() {
        eprintln!("错误: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse(std::env::args().skip(1));
    let command = args.positional.first().cloned().ok_or(USAGE)?;

    let db_path = args.db_path();
    tracing::info!(
        app = capacity_loss_aps::APP_NAME,
        version = capacity_loss_aps::VERSION,
        db = %db_path,
        command = %command,
        "启动"
    );
    let api = DisruptionApi::open(&db_path)?;

    match command.as_str() {
        "evaluate" => evaluate(&api, &args),
        "config-show" => {
            println!("{}", api.config_manager().get_config_snapshot()?);
            Ok(())
        }
        "config-set" => {
            let key = args.positional.get(1).ok_or("config-set 需要 <key> <value>")?;
            let value = args.positional.get(2).ok_or("config-set 需要 <key> <value>")?;
            api.config_manager().set_config_value(key, value)?;
            // 立即校验, 非法组合直接报错
            api.load_config()?;
            println!("{} = {}", key, value);
            Ok(())
        }
        "audits" => {
            let limit = match args.options.get("limit") {
                Some(raw) => raw.parse::<usize>().map_err(|_| format!("--limit 非法: {}", raw))?,
                None => 20,
            };
            let audits = api.recent_audits(limit)?;
            println!("{}", serde_json::to_string_pretty(&audits)?);
            Ok(())
        }
        other => Err(format!("未知命令: {}\n{}", other, USAGE).into()),
    }
}

fn evaluate(api: &DisruptionApi, args: &CliArgs) -> Result<(), Box<dyn Error>> {
    let date = NaiveDate::parse_from_str(args.required("date")?, "%Y-%m-%d")?;
    let shift_raw = args.required("shift")?;
    let shift = ShiftCode::parse(shift_raw).ok_or_else(|| format!("班次代码非法: {}", shift_raw))?;
    let event = LossEvent::new(
        date,
        shift,
        args.required("line")?,
        args.required("part")?,
        args.number("lost")?,
        args.number("repair-hours")?,
    );

    let year = match args.options.get("year") {
        Some(raw) => raw.parse::<i32>().map_err(|_| format!("--year 非法: {}", raw))?,
        None => Local::now().year(),
    };
    let plan = PlanImporter::new(year).import_file(args.required("plan")?)?;
    let inventory = InventoryImporter.import_file(args.required("inventory")?)?;

    let output = if args.has_flag("record") {
        serde_json::to_string_pretty(&api.report_and_evaluate(&event, &plan, &inventory)?)?
    } else {
        serde_json::to_string_pretty(&api.evaluate(&event, &plan, &inventory)?)?
    };
    println!("{}", output);
    Ok(())
}
