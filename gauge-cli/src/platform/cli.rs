//! CLI 格式化输出
//!
//! 提供命令行友好的结果显示、错误显示和源码上下文打印。

use gauge_api::{GaugeError, ModuleOutput, ProjectNotice, RunSuccess, Value};

/// 输出模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// 什么都不打印
    None,
    /// 有末尾表达式时打印结果，否则打印绑定
    ResultOrBindings,
    /// 结果和绑定都打印
    Both,
}

/// 打印成功的输出
pub fn print_output(output: &ModuleOutput, success: &RunSuccess, mode: OutputMode, show_time: bool) {
    let bindings = Value::dict(success.bindings.clone());
    match mode {
        OutputMode::None => {}
        OutputMode::ResultOrBindings => {
            if success.result == Value::Void {
                println!("{bindings}");
            } else {
                println!("{}", success.result);
            }
        }
        OutputMode::Both => {
            println!("Result: {}", success.result);
            println!("Bindings: {bindings}");
        }
    }

    if let Some(profile) = &success.profile {
        eprintln!("[Profile]");
        for entry in &profile.entries {
            eprintln!(
                "{:>4}:{:<3} {:>10.3}ms  {}",
                entry.location.start.line,
                entry.location.start.column,
                entry.elapsed.as_secs_f64() * 1000.0,
                entry.label
            );
        }
    }

    if show_time {
        eprintln!("Time: {:.3}s", output.execution_time.as_secs_f64());
    }
}

/// 打印一条项目通知
pub fn print_notice(notice: &ProjectNotice) {
    match notice {
        ProjectNotice::OutputCommitted { name, id, ok } => {
            let status = if *ok { "ok" } else { "failed" };
            eprintln!("[event] output {name} {} {status}", id.short());
        }
        ProjectNotice::ModuleLoaded { name } => eprintln!("[event] loaded {name}"),
        ProjectNotice::LoadFailed { name, error } => eprintln!("[event] load failed {name}: {error}"),
    }
}

/// 打印错误并显示源代码上下文
pub fn print_error_with_source(e: &GaugeError, source: &str) {
    eprintln!("❌ {}", e.to_report());

    if let (Some(error_line), Some(col)) = (e.line(), e.column()) {
        print_source_context(source, error_line, col);
    }
}

/// 打印源代码上下文（显示错误行前后几行）
pub fn print_source_context(source: &str, error_line: usize, error_col: usize) {
    const CONTEXT_LINES: usize = 3;

    let lines: Vec<&str> = source.lines().collect();
    let total_lines = lines.len();

    if error_line == 0 || error_line > total_lines {
        return;
    }

    let start_line = error_line.saturating_sub(CONTEXT_LINES).max(1);
    let end_line = (error_line + CONTEXT_LINES).min(total_lines);
    let width = end_line.to_string().len();

    let separator = "-".repeat(width + 1);
    eprintln!("{separator}|--");

    for (index, line) in lines.iter().enumerate().take(end_line).skip(start_line - 1) {
        let line_idx = index + 1;
        eprintln!("{line_idx:>width$} | {line}");
        if line_idx == error_line {
            // 指向错误位置的标记
            let marker = " ".repeat(error_col.saturating_sub(1));
            eprintln!("{} | {marker}^", " ".repeat(width));
        }
    }

    eprintln!("{separator}|--");
}
