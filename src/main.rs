use clap::Parser;
use staff_roster::config::cli::{Cli, Command, ListArgs, ReportKind};
use staff_roster::config::{SourceKind, TomlConfig};
use staff_roster::core::export::{self, OutputFormat};
use staff_roster::core::reports::{self, format_salary};
use staff_roster::utils::error::Result;
use staff_roster::utils::{logger, validation::Validate};
use staff_roster::{JsonFileSource, ListViewEngine, RecordSource, RemoteRecordSource};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting staff-roster CLI");
    tracing::debug!("CLI args: {:?}", cli);

    if let Err(e) = run(cli).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ staff-roster failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        std::process::exit(e.severity().exit_code());
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📋 Loading config: {}", path.display());
            TomlConfig::from_file(path)?
        }
        None => TomlConfig::default(),
    };

    if let Some(dir) = &cli.data_dir {
        config.source.r#type = SourceKind::File;
        config.source.data_dir = Some(dir.display().to_string());
    }

    // 驗證配置
    config.validate()?;

    match config.source.r#type {
        SourceKind::File => {
            let data_dir = config.source.data_dir.clone().unwrap_or_default();
            tracing::info!("📂 Using local snapshots in {}", data_dir);
            let engine = ListViewEngine::new(JsonFileSource::new(data_dir), &config.views)?;
            execute(&engine, &config, cli.command).await
        }
        SourceKind::Api => {
            let source = RemoteRecordSource::from_config(&config.source)?;
            let engine = ListViewEngine::new(source, &config.views)?;
            execute(&engine, &config, cli.command).await
        }
    }
}

async fn execute<S: RecordSource>(
    engine: &ListViewEngine<S>,
    config: &TomlConfig,
    command: Command,
) -> Result<()> {
    match command {
        Command::List(args) => list(engine, config, args).await,
        Command::Departments => departments(engine).await,
        Command::Report { kind } => report(engine, kind).await,
    }
}

async fn list<S: RecordSource>(
    engine: &ListViewEngine<S>,
    config: &TomlConfig,
    args: ListArgs,
) -> Result<()> {
    args.validate()?;

    let params = args.query_params();
    let entity_view = engine.view(args.entity);
    let view = engine.run(args.entity, &params).await?;

    let format = args.format.unwrap_or_else(|| config.output_format());
    let columns = entity_view.definition.display_columns();
    let rendered = export::render(&view.visible, &columns, format)?;

    let output = args
        .output
        .clone()
        .or_else(|| config.output_path().map(PathBuf::from));
    match output {
        Some(path) => {
            tokio::fs::write(&path, rendered).await?;
            tracing::info!("📁 Output saved to: {}", path.display());
            println!("📁 Output saved to: {}", path.display());
        }
        None => print!("{}", rendered),
    }

    if format == OutputFormat::Table {
        let noun = &entity_view.definition.noun;
        if view.is_empty() {
            println!("No {} found", noun);
        }
        if params.is_filtering() {
            println!("{}", view.banner(noun));
        } else {
            println!("{} {}", view.total_count, noun);
        }
    }
    Ok(())
}

async fn departments<S: RecordSource>(engine: &ListViewEngine<S>) -> Result<()> {
    let overview = engine.department_overview().await?;

    println!("{:<24} {:<24} {:>9}  {}", "Department", "Manager", "Employees", "Deletable");
    for department in &overview.departments {
        println!(
            "{:<24} {:<24} {:>9}  {}",
            department.name,
            department.manager.as_deref().unwrap_or("No manager assigned"),
            department.employee_count,
            if department.can_delete() { "yes" } else { "no" }
        );
    }
    println!();
    println!("Total departments: {}", overview.total_departments);
    println!("Total employees:   {}", overview.total_employees);
    println!("Avg per department: {}", overview.average_per_department);
    Ok(())
}

async fn report<S: RecordSource>(engine: &ListViewEngine<S>, kind: ReportKind) -> Result<()> {
    match kind {
        ReportKind::Overview => {
            let report = engine.employee_report().await?;
            let stats = &report.stats;
            println!("Total employees:   {}", stats.total_employees);
            println!("Active:            {}", stats.active_employees);
            println!("On leave:          {}", stats.on_leave);
            println!("Departments:       {}", stats.total_departments);
            for department in &stats.departments {
                println!("  {:<24} {}", department.name, department.count);
            }
            println!();
            println!("Recent hires:");
            for hire in &report.recent_hires {
                println!(
                    "  {} {:<20} {}",
                    hire.text("first_name_c"),
                    hire.text("last_name_c"),
                    reports::format_date(hire.get("start_date_c"))
                );
            }
        }
        ReportKind::Salary => {
            let report = engine.employee_report().await?;
            for bucket in &report.salary_buckets {
                println!("{:<16} {}", bucket.label, bucket.count);
            }
            match report.salary {
                Some(summary) => {
                    let money = |n: f64| format_salary(Some(&serde_json::json!(n)));
                    println!();
                    println!("Average: {}", money(summary.average));
                    println!("Highest: {}", money(summary.highest));
                    println!("Lowest:  {}", money(summary.lowest));
                }
                None => println!("No salary data"),
            }
        }
        ReportKind::Status => {
            let report = engine.employee_report().await?;
            for slice in &report.status {
                println!("{:<10} {}", slice.label, slice.count);
            }
        }
        ReportKind::Students => {
            let stats = engine.student_stats().await?;
            println!("Total students: {}", stats.total_students);
            for group in &stats.grade_groups {
                println!("  Grade {:<4} {}", group.grade, group.count);
            }
        }
    }
    Ok(())
}
