//! 印刷モジュール - OSの印刷機構にPDFを渡す
//!
//! - Linux / macOS: CUPS の `lpr`
//! - Windows: SumatraPDF → Adobe Reader → rundll32 の順に試す
//!
//! 印刷ジョブの完了は待たない。

#[cfg(windows)]
use std::os::windows::process::CommandExt;
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};

use crate::error::PrintError;

/// 印刷の投入先
pub trait Printer {
    /// PDFファイルを印刷キューに投入
    fn submit(&self, pdf_path: &Path) -> Result<(), PrintError>;
}

/// OSの印刷コマンドを使うプリンター
#[derive(Debug, Clone, Default)]
pub struct SystemPrinter {
    /// プリンター名（未指定なら既定のプリンター）
    printer_name: Option<String>,
}

/// 実行するコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl SystemPrinter {
    pub fn new(printer_name: Option<String>) -> Self {
        Self {
            printer_name: printer_name.filter(|n| !n.trim().is_empty()),
        }
    }

    pub fn printer_name(&self) -> Option<&str> {
        self.printer_name.as_deref()
    }

    /// OSごとの印刷コマンド候補（先頭から順に試す）
    pub fn commands_for(&self, os: &str, pdf_path: &Path) -> Result<Vec<PrintCommand>, PrintError> {
        let file = pdf_path.to_string_lossy().into_owned();
        let name = self.printer_name.clone();

        let commands = match os {
            "linux" | "macos" | "freebsd" | "openbsd" | "netbsd" => {
                let mut args = Vec::new();
                if let Some(name) = name {
                    args.push("-P".to_string());
                    args.push(name);
                }
                args.push(file);
                vec![PrintCommand {
                    program: "lpr".into(),
                    args,
                }]
            }
            "windows" => {
                let sumatra_target = match &name {
                    Some(n) => vec!["-print-to".to_string(), n.clone()],
                    None => vec!["-print-to-default".to_string()],
                };
                let mut sumatra_args = sumatra_target;
                sumatra_args.push("-silent".into());
                sumatra_args.push(file.clone());

                let mut acrobat_args = vec!["/t".to_string(), file.clone()];
                if let Some(n) = &name {
                    acrobat_args.push(n.clone());
                }

                vec![
                    PrintCommand {
                        program: "SumatraPDF.exe".into(),
                        args: sumatra_args,
                    },
                    PrintCommand {
                        program: "AcroRd32.exe".into(),
                        args: acrobat_args,
                    },
                    PrintCommand {
                        program: "rundll32.exe".into(),
                        args: vec!["mshtml.dll,PrintHTML".into(), file],
                    },
                ]
            }
            other => return Err(PrintError::UnsupportedPlatform(other.to_string())),
        };

        Ok(commands)
    }
}

impl Printer for SystemPrinter {
    fn submit(&self, pdf_path: &Path) -> Result<(), PrintError> {
        let commands = self.commands_for(std::env::consts::OS, pdf_path)?;

        let mut last_error = None;
        for command in commands {
            match run(&command) {
                Ok(()) => {
                    info!(program = %command.program, path = %pdf_path.display(), "印刷キューに送信");
                    return Ok(());
                }
                Err(e) => {
                    warn!(program = %command.program, error = %e, "印刷に失敗。次の方法を試します");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| PrintError::UnsupportedPlatform(std::env::consts::OS.to_string())))
    }
}

fn run(command: &PrintCommand) -> Result<(), PrintError> {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args);

    #[cfg(windows)]
    cmd.creation_flags(0x08000000); // CREATE_NO_WINDOW

    let output = cmd.output().map_err(|source| PrintError::Launch {
        program: command.program.clone(),
        source,
    })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let detail = if stderr.is_empty() {
        output.status.to_string()
    } else {
        stderr
    };
    Err(PrintError::CommandFailed {
        program: command.program.clone(),
        detail,
    })
}
