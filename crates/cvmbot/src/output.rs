use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use cvmbot_session::{SessionEnd, SessionOutcome};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    frame: &'a str,
    size: usize,
    elements: &'a [String],
}

#[derive(Serialize)]
struct ElementsOutput<'a> {
    opcode: &'a str,
    args: &'a [String],
    elements: &'a [String],
}

#[derive(Serialize)]
struct OutcomeOutput<'a> {
    node_id: &'a str,
    url: &'a str,
    status: &'static str,
    detail: String,
}

/// Print an encoded frame built from `elements`.
pub fn print_frame(frame: &str, elements: &[String], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                frame,
                size: frame.len(),
                elements,
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["FRAME", "BYTES"]);
            table.add_row(vec![frame.to_string(), frame.len().to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{frame}"),
        OutputFormat::Raw => print_raw(frame.as_bytes()),
    }
}

/// Print decoded elements. `elements` is never empty.
pub fn print_elements(elements: &[String], format: OutputFormat) {
    let (opcode, args) = match elements.split_first() {
        Some((opcode, args)) => (opcode.as_str(), args),
        None => ("", elements),
    };

    match format {
        OutputFormat::Json => {
            let out = ElementsOutput {
                opcode,
                args,
                elements,
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["INDEX", "BYTES", "VALUE"]);
            for (index, element) in elements.iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    element.len().to_string(),
                    element.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let args: Vec<String> = args.iter().map(|arg| format!("{arg:?}")).collect();
            println!("opcode={opcode} args=[{}]", args.join(", "));
        }
        OutputFormat::Raw => {
            for element in elements {
                println!("{element}");
            }
        }
    }
}

/// Print how every endpoint's session ended.
pub fn print_outcomes(outcomes: &[SessionOutcome], format: OutputFormat) {
    let rows: Vec<OutcomeOutput<'_>> = outcomes.iter().map(outcome_row).collect();

    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Table => {
            let mut table = new_table(vec!["NODE", "URL", "STATUS", "DETAIL"]);
            for row in rows {
                table.add_row(vec![
                    row.node_id.to_string(),
                    row.url.to_string(),
                    row.status.to_string(),
                    row.detail,
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for row in rows {
                println!(
                    "node={} url={} status={} detail={}",
                    row.node_id, row.url, row.status, row.detail
                );
            }
        }
    }
}

fn outcome_row(outcome: &SessionOutcome) -> OutcomeOutput<'_> {
    let (status, detail) = match &outcome.result {
        Ok(SessionEnd::RemoteClosed) => ("closed", "closed by server".to_string()),
        Ok(SessionEnd::Shutdown) => ("shutdown", "shut down".to_string()),
        Ok(SessionEnd::Rejected(reason)) => ("rejected", reason.to_string()),
        Err(err) => ("failed", err.to_string()),
    };
    OutcomeOutput {
        node_id: &outcome.endpoint.node_id,
        url: &outcome.endpoint.url,
        status,
        detail,
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}
