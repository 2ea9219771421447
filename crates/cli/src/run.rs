//! `codenest run`, `codenest languages` and judge key management.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use codenest_config::secrets::{self, KeySource};
use codenest_judge_client::{
    language_for_extension, supported_languages, JudgeClient, JudgeClientConfig,
    PollPolicy, SubmissionBackend,
};

use crate::account::read_secret;
use crate::exit_codes::*;
use crate::{CliError, Context};

pub fn cmd_run(
    ctx: &Context,
    file: PathBuf,
    language: Option<String>,
    stdin: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let source = fs::read_to_string(&file)
        .map_err(|e| CliError::usage(format!("Cannot read {}: {}", file.display(), e)))?;
    let language = resolve_language(&file, language)?;
    let input = stdin.as_deref().map(read_input).transpose()?;

    let judge = &ctx.config.judge;
    let key = secrets::judge_api_key();
    if key.source == KeySource::None {
        tracing::debug!("No judge API key configured; sending unauthenticated requests");
    }
    let client = JudgeClient::new(JudgeClientConfig {
        base_url: judge.base_url.clone(),
        api_key: key.value,
        host: judge.host.clone(),
        poll: PollPolicy {
            interval: Duration::from_millis(judge.poll_interval_ms),
            max_attempts: judge.max_attempts,
        },
    })
    .map_err(CliError::judge)?;

    tracing::debug!("Running {} as {}", file.display(), language);
    let result = client
        .execute_code(&source, &language, input.as_deref())
        .map_err(CliError::judge)?;

    if json {
        let out = serde_json::to_string_pretty(&result).map_err(|e| CliError::io(e.to_string()))?;
        println!("{}", out);
    } else {
        print!("{}", result.output);
        if let Some(ref err) = result.error {
            eprintln!("{}", err.trim_end());
        }
        let mut summary = result.status.to_string();
        if let Some(t) = result.execution_time {
            summary.push_str(&format!(", {:.3}s", t));
        }
        if let Some(kb) = result.memory_usage {
            summary.push_str(&format!(", {} KB", kb));
        }
        eprintln!("[{}]", summary);
    }

    if result.success {
        Ok(())
    } else {
        Err(CliError { code: EXIT_RUN_FAILED, message: String::new(), hint: None })
    }
}

/// `--language` wins; otherwise go by file extension
fn resolve_language(file: &Path, language: Option<String>) -> Result<String, CliError> {
    if let Some(name) = language {
        return Ok(name);
    }
    let ext = file.extension().and_then(|e| e.to_str()).unwrap_or("");
    language_for_extension(ext).map(|l| l.name.to_string()).ok_or_else(|| CliError {
        code: EXIT_RUN_UNSUPPORTED,
        message: format!("Cannot infer a language for {}", file.display()),
        hint: Some("pass --language (see `codenest languages`)".into()),
    })
}

fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::io(format!("Cannot read stdin: {}", e)))?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|e| CliError::usage(format!("Cannot read {}: {}", path.display(), e)))
}

pub fn cmd_languages(json: bool) -> Result<(), CliError> {
    let langs = supported_languages();
    if json {
        let rows: Vec<_> = langs
            .iter()
            .map(|l| {
                serde_json::json!({
                    "name": l.name,
                    "id": l.id,
                    "display": l.display,
                    "extensions": l.extensions,
                })
            })
            .collect();
        let out = serde_json::to_string_pretty(&rows).map_err(|e| CliError::io(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    for l in langs {
        println!("{:<12} {:>3}  {:<30} .{}", l.name, l.id, l.display, l.extensions.join(" ."));
    }
    Ok(())
}

// ── Judge key ───────────────────────────────────────────────────────

pub fn cmd_judge_key_set(key: Option<String>) -> Result<(), CliError> {
    let key = read_secret(key, "Judge API key: ", "pass the key as an argument or pipe it on stdin")?;
    secrets::set_judge_api_key(key.trim()).map_err(|e| {
        CliError::config(e).with_hint(format!("set {} instead", secrets::JUDGE_KEY_ENV))
    })?;
    eprintln!("Judge API key saved to keychain");
    Ok(())
}

pub fn cmd_judge_key_delete() -> Result<(), CliError> {
    secrets::delete_judge_api_key().map_err(CliError::config)?;
    eprintln!("Judge API key removed");
    Ok(())
}

pub fn cmd_judge_key_status() -> Result<(), CliError> {
    let lookup = secrets::judge_api_key();
    println!("source: {}", lookup.source);
    if lookup.value.is_none() {
        eprintln!("No judge API key. Requests go out without the vendor key header.");
    }
    Ok(())
}
