use atlas_reporter::config::{CliArgs, FileConfig, Settings};
use atlas_reporter::utils::{logger, validation::Validate};
use atlas_reporter::{run_command, CommandOutcome};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting atlas-reporter");

    let settings = match FileConfig::discover(&args.config) {
        Ok(file) => Settings::resolve(args.command, args.overrides(), file).with_monitoring(args.monitor),
        Err(e) => exit_with(&e, 1),
    };
    if args.verbose {
        tracing::debug!("Settings: {:?}", settings);
    }

    // 驗證配置，失敗時不做任何事直接結束
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e, 1);
    }

    if settings.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    match run_command(&settings).await {
        Ok(CommandOutcome::Report(outcome)) => {
            tracing::info!("✅ {} report completed ({} rows)", outcome.kind, outcome.row_count);
            println!("📁 Output saved to: {}", outcome.output_path);
        }
        Ok(CommandOutcome::Rotation(summary)) => {
            println!(
                "🔑 Rotated {} users, {} failed",
                summary.rotated(),
                summary.failed()
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
                settings.command.name(),
                e,
                e.category(),
                e.severity()
            );
            let exit_code = e.severity().exit_code();
            exit_with(&e, exit_code);
        }
    }
}

fn exit_with(e: &atlas_reporter::ReporterError, code: i32) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
    std::process::exit(code)
}
