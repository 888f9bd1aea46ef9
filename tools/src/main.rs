//! hub-runner: headless driver for the client intelligence hub.
//!
//! Usage:
//!   hub-runner --data-dir ./data --seed 42 --records 100
//!   hub-runner --data-dir ./data --ipc-mode
//!
//! In IPC mode the runner reads one JSON command per line on stdin and
//! answers each with one JSON line on stdout.

use anyhow::Result;
use clienthub_core::{
    command::HubEvent,
    config::HubConfig,
    engine::ApplicationState,
    filter::FilterMode,
    insight::{forecasts, group_thousands},
    snapshot::{DashboardSnapshot, SubsetTable},
    store::{export_records, RecordStore},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Event { event: HubEvent },
    Rows,
    Export,
    Forecast,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");

    let mut config = HubConfig::load(data_dir)?;
    config.seed = parse_arg(&args, "--seed", config.seed);
    config.record_count = parse_arg(&args, "--records", config.record_count);
    if let Some(dir) = args.windows(2).find(|w| w[0] == "--export-dir") {
        config.export_dir = PathBuf::from(&dir[1]);
    }
    if args.iter().any(|a| a == "--compose-filters") {
        config.filter_mode = FilterMode::Composed;
    }

    if !ipc_mode {
        println!("Client Intelligence Hub: hub-runner");
        println!("  seed:       {}", config.seed);
        println!("  records:    {}", config.record_count);
        println!("  data file:  {}", config.data_file.display());
        println!("  filters:    {:?}", config.filter_mode);
        println!();
    }

    let store = RecordStore::load(&config)?;
    log::info!("{} clients available ({:?})", store.len(), store.source());
    let state = ApplicationState::new(&store, config.filter_mode)?;

    if ipc_mode {
        run_ipc_loop(state, &config)?;
    } else {
        print_summary(&state);
    }
    Ok(())
}

fn run_ipc_loop(mut state: ApplicationState, config: &HubConfig) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {
                write_json(&mut stdout, &DashboardSnapshot::capture(&state))?;
            }
            IpcCommand::Event { event } => match state.apply(&event) {
                Ok(next) => {
                    state = next;
                    write_json(&mut stdout, &DashboardSnapshot::capture(&state))?;
                }
                Err(e) => write_error(&mut stdout, &e.to_string())?,
            },
            IpcCommand::Rows => match SubsetTable::capture(&state) {
                Ok(table) => write_json(&mut stdout, &table)?,
                Err(e) => write_error(&mut stdout, &e.to_string())?,
            },
            IpcCommand::Export => {
                let now = chrono::Local::now().naive_local();
                match export_records(&config.export_dir, state.subset(), now) {
                    Ok(path) => write_json(
                        &mut stdout,
                        &serde_json::json!({ "exported": path.display().to_string() }),
                    )?,
                    Err(e) => write_error(&mut stdout, &e.to_string())?,
                }
            }
            IpcCommand::Forecast => {
                match forecasts(state.subset(), config.seed, config.forecast_limit) {
                    Ok(rows) => write_json(&mut stdout, &rows)?,
                    Err(e) => write_error(&mut stdout, &e.to_string())?,
                }
            }
        }
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string(value)?)?;
    out.flush()?;
    Ok(())
}

fn write_error(out: &mut impl Write, message: &str) -> Result<()> {
    write_json(out, &serde_json::json!({ "error": message }))
}

fn print_summary(state: &ApplicationState) {
    println!("=== {} ===", state.view.status);
    let Some(analysis) = &state.view.analysis else {
        println!("  Нет данных для отображения");
        return;
    };

    let f = &analysis.metrics.financial;
    println!("=== ФИНАНСОВЫЙ ОБЗОР ===");
    println!("  Общий баланс:            {} ₽", group_thousands(f.total_balance));
    println!("  Средний доход:           {} ₽", group_thousands(f.mean_income.round() as u64));
    println!("  Средний баланс:          {} ₽", group_thousands(f.mean_balance.round() as u64));
    println!("  Премиум-клиенты:         {}", f.premium_clients);
    println!("  Активы под управлением:  {} ₽", group_thousands(f.total_assets.round() as u64));
    println!("  Всего транзакций:        {}", f.total_transactions);
    println!("  Всего клиентов:          {}", f.client_count);

    let d = &analysis.metrics.demographic;
    println!();
    println!("=== ДЕМОГРАФИЯ ===");
    println!("  Средний возраст:   {:.1} лет", d.mean_age);
    println!("  Медианный возраст: {:.1} лет", d.median_age);
    println!("  Самый молодой:     {} лет", d.min_age);
    println!("  Самый старший:     {} лет", d.max_age);
    for bin in &d.age_distribution {
        println!("    {}: {} клиентов", bin.bucket, bin.count);
    }
    println!("  Топ регионы:");
    for region in &d.top_regions {
        println!("    {}: {} клиентов", region.label, region.count);
    }

    let p = &analysis.metrics.portfolio;
    println!();
    println!("=== ПРОДУКТЫ И РИСКИ ===");
    for row in p.products.iter().chain(p.risk_levels.iter()) {
        println!("    {}: {} ({:.1}%)", row.label, row.count, row.share_pct);
    }
    println!("  Средняя лояльность:      {:.1} лет", p.mean_loyalty_years);
    println!("  Максимальная лояльность: {} лет", p.max_loyalty_years);

    println!();
    println!("=== ИНСАЙТЫ ===");
    for (i, line) in analysis.insights.iter().enumerate() {
        println!("  {}. {line}", i + 1);
    }
    println!();
    println!("=== РЕКОМЕНДАЦИИ ===");
    for line in &analysis.recommendations {
        println!("  • {line}");
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
