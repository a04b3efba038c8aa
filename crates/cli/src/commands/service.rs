//! Service status commands

use anyhow::Result;
use colored::Colorize;

use crate::client::ApiClient;
use crate::output::{print_json, print_success, OutputFormat};

/// Check service liveness
pub async fn health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let status = client.health().await?;

    match format {
        OutputFormat::Json => print_json(&status)?,
        OutputFormat::Table => {
            print_success(&format!("{} is {}", client.base_url(), status.status))
        }
    }

    Ok(())
}

/// Show model provenance
pub async fn meta(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let info = client.meta().await?;

    match format {
        OutputFormat::Json => print_json(&info)?,
        OutputFormat::Table => {
            println!("{}", "Model".bold());
            println!("{}", "=".repeat(50));
            println!("Name:                   {}", info.model_name.cyan());
            println!("Version:                {}", info.version);
            println!("Trained on:             {}", info.trained_on);
            println!("Labels:                 {}", info.labels.join(", "));

            if let Some(metrics) = &info.metrics {
                println!();
                println!("{}", "Evaluation".bold());
                println!("{}", "-".repeat(50));
                if let Some(accuracy) = metrics.accuracy {
                    println!("Accuracy:               {:.4}", accuracy);
                }
                if let Some(f1) = metrics.f1_macro {
                    println!("F1 (macro):             {:.4}", f1);
                }
            }
        }
    }

    Ok(())
}
