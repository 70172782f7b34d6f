// src/bin/check_file.rs
//
// Validate forecast files locally, without touching any pull request:
//
//     check_file data-processed/KIT/2024-01-08-KIT.csv
//     check_file 'data-processed/**/*.csv'

use anyhow::{Context, Result};
use hubcheck::checks::{self, has_errors};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        anyhow::bail!("usage: check_file <file-or-glob>...");
    }

    let mut failed = 0usize;
    let mut checked = 0usize;

    for arg in &args {
        let paths: Vec<std::path::PathBuf> = if arg.contains('*') {
            glob::glob(arg)
                .with_context(|| format!("invalid glob `{}`", arg))?
                .collect::<std::result::Result<_, _>>()?
        } else {
            vec![arg.into()]
        };

        for path in paths {
            checked += 1;
            let findings = checks::validate_forecast_file(&path)
                .with_context(|| format!("validating {}", path.display()))?;
            if findings.is_empty() {
                info!(file = %path.display(), "ok");
                continue;
            }
            for finding in &findings {
                println!("{}: {}", path.display(), finding.message);
            }
            if has_errors(&findings) {
                failed += 1;
            }
        }
    }

    if failed > 0 {
        error!(failed, checked, "validation errors found");
        anyhow::bail!("errors found in {} of {} file(s)", failed, checked);
    }
    info!(checked, "all files passed");
    Ok(())
}
