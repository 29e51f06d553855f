use crate::AnnotateResult;
use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonAnnotation {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub text: String,
    pub alias: String,
    pub definition: String,
    pub context: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput {
    pub files_scanned: usize,
    pub total_annotations: usize,
    pub annotations: Vec<JsonAnnotation>,
}

impl JsonOutput {
    pub fn from_results<P: AsRef<Path>>(results: &[(P, AnnotateResult)]) -> Self {
        let annotations: Vec<JsonAnnotation> = results
            .iter()
            .flat_map(|(path, result)| {
                let file = path.as_ref().display().to_string();
                result.annotations.iter().map(move |a| JsonAnnotation {
                    file: file.clone(),
                    line: a.line,
                    column: a.column,
                    text: a.text.clone(),
                    alias: a.alias.clone(),
                    definition: a.definition.clone(),
                    context: a.context.clone(),
                })
            })
            .collect();

        Self {
            files_scanned: results.len(),
            total_annotations: annotations.len(),
            annotations,
        }
    }
}

pub fn print_json<P: AsRef<Path>>(results: &[(P, AnnotateResult)]) -> serde_json::Result<()> {
    let output = JsonOutput::from_results(results);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn print_annotations(file_path: &Path, result: &AnnotateResult, colored_output: bool) {
    if result.annotations.is_empty() {
        return;
    }

    let file_name = file_path.display().to_string();

    if colored_output {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    for annotation in &result.annotations {
        let line_info = format!("{}:{}", annotation.line, annotation.column);

        if colored_output {
            println!(
                "  {} {} {}",
                line_info.blue().bold(),
                annotation.text.green().bold(),
                format_context(&annotation.context, &annotation.text, colored_output)
            );
            println!("    {} {}", "→".dimmed(), annotation.definition);
        } else {
            println!("  {} {} {}", line_info, annotation.text, annotation.context);
            println!("    → {}", annotation.definition);
        }
    }
}

fn format_context(context: &str, word: &str, colored: bool) -> String {
    if colored {
        context.replace(word, &word.green().to_string())
    } else {
        context.to_string()
    }
}

pub fn print_summary(total: usize, written: usize, files: usize, colored: bool) {
    println!();
    let file_word = if files == 1 { "file" } else { "files" };

    if total == 0 {
        if colored {
            println!("{}", "No glossary terms found.".yellow());
        } else {
            println!("No glossary terms found.");
        }
        return;
    }

    let annotation_word = if total == 1 {
        "annotation"
    } else {
        "annotations"
    };

    if colored {
        println!(
            "{} {} {} in {} {}",
            "✓".green().bold(),
            total.to_string().green().bold(),
            annotation_word,
            files,
            file_word
        );
    } else {
        println!("✓ {} {} in {} {}", total, annotation_word, files, file_word);
    }

    if written > 0 {
        let written_word = if written == 1 { "file" } else { "files" };
        println!("  {} {} written", written, written_word);
    }
}
