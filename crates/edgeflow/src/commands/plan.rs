use crate::Target;
use crate::commands::print_action;
use crate::context::Context;
use anyhow::Context as _;
use colored::Colorize;
use edgeflow_cloud::Plan;
use edgeflow_config::Manifest;

/// ルックアップと差分判定だけを行い、リソースごとの判定を集める
pub async fn build(
    ctx: &Context,
    manifest: &Manifest,
    only: Option<Target>,
) -> anyhow::Result<Plan> {
    let mut plan = Plan::default();

    if Target::selected(only, Target::Network) {
        for spec in &manifest.network {
            let action = ctx
                .network
                .plan(spec)
                .await
                .with_context(|| format!("ネットワーク '{}' の確認に失敗しました", spec.name))?;
            plan.push(action);
        }
    }

    if Target::selected(only, Target::Cdn) {
        for spec in &manifest.cdn {
            let action = ctx
                .cdn
                .plan(spec)
                .await
                .with_context(|| {
                    format!("ディストリビューション '{}' の確認に失敗しました", spec.alias)
                })?;
            plan.push(action);
        }
    }

    if Target::selected(only, Target::Dns) {
        for spec in &manifest.dns {
            let action = ctx
                .dns
                .plan(spec)
                .await
                .with_context(|| format!("DNSエイリアス '{}' の確認に失敗しました", spec.domain))?;
            plan.push(action);
        }
    }

    Ok(plan)
}

pub fn print(plan: &Plan) {
    for action in &plan.actions {
        print_action(action);
    }
    println!();
    println!("{}", plan.summary().to_string().bold());
}

pub async fn handle(
    ctx: &Context,
    manifest: &Manifest,
    only: Option<Target>,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        let plan = build(ctx, manifest, only).await?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("変更内容を確認中... (環境: {})", ctx.label).blue()
    );
    if let Some(region) = &ctx.region {
        println!("リージョン: {}", region.cyan());
    }
    println!();

    let plan = build(ctx, manifest, only).await?;
    if plan.actions.is_empty() {
        println!("{}", "対象のリソースがありません".yellow());
        return Ok(());
    }
    print(&plan);

    if plan.has_changes {
        println!();
        println!("反映するには {} を実行してください", "edge apply --yes".cyan());
    }
    Ok(())
}
