use crate::config;
use crate::context::{RunMode, StartupContext};
use crate::engine::{self, CommandEngine, EngineTask, ServeOpts};
use crate::fallback;
use colored::Colorize;
use std::error::Error;

/// Full startup sequence: config gate, engine load, then the awaited
/// init -> generate -> serve chain. The first failure aborts the launch;
/// only a failed engine load diverts to the built-in fallback server.
pub async fn start(ctx: &StartupContext) -> Result<(), Box<dyn Error>> {
    if !config::config_exists(&ctx.root) {
        return Err(format!(
            "{} not found. Make sure you are in a site project directory.",
            config::CONFIG_FILE
        )
        .into());
    }

    match config::load(&ctx.root) {
        Ok(site) => {
            if let Some(title) = site.title {
                println!("Booting {}", title.bold());
            }
            if let Some(description) = site.description {
                println!("{}", description.dimmed());
            }
        }
        Err(e) => eprintln!("{} {}", "Warning:".yellow(), e),
    }

    match engine::load(&ctx.root, &ctx.settings.engine) {
        Ok(eng) => run_engine(&eng, ctx).await,
        Err(e) => {
            eprintln!("{} {}", "Failed to load engine:".red(), e);
            println!("Falling back to the built-in static file server...");
            fallback::serve(&ctx.root, ctx.settings.port).await
        }
    }
}

async fn run_engine(eng: &CommandEngine, ctx: &StartupContext) -> Result<(), Box<dyn Error>> {
    println!("Found engine at {}", eng.program().display());
    let version = eng
        .init()
        .await
        .map_err(|e| format!("Engine failed to initialize: {}", e))?;
    println!("{} ({})", "Engine initialized successfully".green(), version);

    if ctx.settings.run_mode == RunMode::Production {
        println!("Generating static files...");
        eng.call(EngineTask::Generate)
            .await
            .map_err(|e| format!("Engine failed to generate the site: {}", e))?;
    }

    println!(
        "{}",
        format!("Starting engine server at {}", ctx.settings.url()).on_blue()
    );
    eng.call(EngineTask::Serve(Some(ServeOpts {
        port: ctx.settings.port,
        host: ctx.settings.host.clone(),
    })))
    .await
    .map_err(|e| format!("Engine server failed: {}", e))?;

    Ok(())
}

/// Reduced startup path with no config gate and no fallback: the engine is
/// located and initialized, then its server runs with engine defaults and
/// the process exits cleanly once it returns. Errors propagate unchanged.
pub async fn dev(ctx: &StartupContext) -> Result<(), Box<dyn Error>> {
    let eng = engine::load(&ctx.root, &ctx.settings.engine)?;
    eng.init().await?;
    eng.call(EngineTask::Serve(None)).await?;
    std::process::exit(0);
}
