use crate::Target;
use crate::commands::plan;
use crate::context::Context;
use anyhow::Context as _;
use colored::Colorize;
use edgeflow_cloud::ActionType;
use edgeflow_config::Manifest;

fn print_outcome(kind: &str, key: &str, action: ActionType, id: &str) {
    let status = match action {
        ActionType::Create => "✓ 作成".green(),
        ActionType::Update => "✓ 更新".yellow(),
        ActionType::NoOp => "= 変更なし".dimmed(),
    };
    println!("  {} {} {} ({})", status, kind.dimmed(), key.cyan(), id);
}

pub async fn handle(
    ctx: &Context,
    manifest: &Manifest,
    only: Option<Target>,
    yes: bool,
) -> anyhow::Result<()> {
    if !yes {
        plan::handle(ctx, manifest, only, false).await?;
        println!();
        println!("{}", "⚠ 実際のリソースを変更します".yellow().bold());
        println!("実行するには --yes オプションを指定してください");
        return Ok(());
    }

    println!(
        "{}",
        format!("マニフェストを適用中... (環境: {})", ctx.label).blue()
    );
    println!();

    if Target::selected(only, Target::Network) {
        for spec in &manifest.network {
            let outcome = ctx
                .network
                .reconcile(spec, &ctx.label)
                .await
                .with_context(|| format!("ネットワーク '{}' の適用に失敗しました", spec.name))?;
            print_outcome("network", &spec.name, outcome.action, &outcome.resource);
        }
    }

    if Target::selected(only, Target::Cdn) {
        for spec in &manifest.cdn {
            let outcome = ctx
                .cdn
                .reconcile(spec, &ctx.label)
                .await
                .with_context(|| {
                    format!("ディストリビューション '{}' の適用に失敗しました", spec.alias)
                })?;
            print_outcome("distribution", &spec.alias, outcome.action, &outcome.resource.id);
        }
    }

    if Target::selected(only, Target::Dns) {
        for spec in &manifest.dns {
            let outcome = ctx
                .dns
                .reconcile(spec, &ctx.label)
                .await
                .with_context(|| format!("DNSエイリアス '{}' の適用に失敗しました", spec.domain))?;
            let types = outcome
                .resource
                .iter()
                .map(|r| r.record_type.as_str())
                .collect::<Vec<_>>()
                .join("/");
            print_outcome("dns-alias", &spec.domain, outcome.action, &types);
        }
    }

    println!();
    println!("{}", "✓ 適用が完了しました".green().bold());
    Ok(())
}
