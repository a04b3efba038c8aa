//! Prediction commands

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_label, color_score, print_json, print_table, truncate, OutputFormat};

const TEXT_COLUMN_WIDTH: usize = 48;

/// Row for batch results table
#[derive(Tabled)]
struct PredictionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Text")]
    text: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Score")]
    score: String,
}

/// Classify one text
pub async fn predict(client: &ApiClient, text: &str, format: OutputFormat) -> Result<()> {
    let prediction = client.predict(text).await?;

    match format {
        OutputFormat::Json => print_json(&prediction)?,
        OutputFormat::Table => {
            println!("Label:                  {}", color_label(&prediction.label).bold());
            println!("Score:                  {}", color_score(prediction.score));
            if !prediction.explain.top_tokens.is_empty() {
                println!(
                    "Top tokens:             {}",
                    prediction.explain.top_tokens.join(", ").dimmed()
                );
            }
        }
    }

    Ok(())
}

/// Classify several texts given as arguments and/or read from a file
pub async fn batch(
    client: &ApiClient,
    texts: Vec<String>,
    file: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let texts = collect_texts(texts, file)?;
    let results = client.predict_batch(texts.clone()).await?;

    match format {
        OutputFormat::Json => print_json(&results)?,
        OutputFormat::Table => {
            let rows: Vec<PredictionRow> = texts
                .iter()
                .zip(&results)
                .enumerate()
                .map(|(index, (text, item))| PredictionRow {
                    index,
                    text: truncate(text, TEXT_COLUMN_WIDTH),
                    label: color_label(&item.label),
                    score: color_score(item.score),
                })
                .collect();
            print_table(&rows);
        }
    }

    Ok(())
}

/// Argument texts followed by the file's non-empty lines
pub fn collect_texts(mut texts: Vec<String>, file: Option<&Path>) -> Result<Vec<String>> {
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        texts.extend(
            content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string),
        );
    }

    if texts.is_empty() {
        bail!("No texts given; pass them as arguments or with --file");
    }
    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_texts_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("texts.txt");
        std::fs::write(&path, "great product\n\n   \nterrible support\n").unwrap();

        let texts = collect_texts(vec!["first".to_string()], Some(&path)).unwrap();
        assert_eq!(texts, vec!["first", "great product", "terrible support"]);
    }

    #[test]
    fn test_collect_texts_requires_input() {
        assert!(collect_texts(Vec::new(), None).is_err());
    }

    #[test]
    fn test_collect_texts_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_texts(Vec::new(), Some(&dir.path().join("nope.txt"))).is_err());
    }
}
