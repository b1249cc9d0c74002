pub mod apply;
pub mod plan;
pub mod validate;

use colored::Colorize;
use edgeflow_cloud::{Action, ActionType};

/// 1リソース分の判定結果を表示
pub fn print_action(action: &Action) {
    let (mark, verb) = match action.action_type {
        ActionType::Create => ("+".green().bold(), "作成".green()),
        ActionType::Update => ("~".yellow().bold(), "更新".yellow()),
        ActionType::NoOp => ("=".dimmed(), "変更なし".dimmed()),
    };
    let reason = action
        .reason
        .as_deref()
        .map(|r| format!(" ({} が異なる)", r))
        .unwrap_or_default();
    println!(
        "  {} {} {} {}{}",
        mark,
        action.resource_type.dimmed(),
        action.resource_id.cyan(),
        verb,
        reason.dimmed()
    );
}
