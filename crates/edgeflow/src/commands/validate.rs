use colored::Colorize;
use edgeflow_config::Manifest;
use std::path::Path;

pub fn handle(path: &Path, manifest: &Manifest) {
    println!("{}", "マニフェストを検証中...".blue());
    println!("マニフェスト: {}", path.display().to_string().cyan());

    if let Err(e) = manifest.validate() {
        eprintln!();
        eprintln!("{}", "✗ マニフェストエラー".red().bold());
        eprintln!("  {}", e);
        std::process::exit(1);
    }

    println!("{}", "✓ マニフェストは正常です！".green().bold());
    println!();
    println!("サマリー:");

    println!("  CDN: {}個", manifest.cdn.len());
    for spec in &manifest.cdn {
        let origins = spec
            .declared_origins()
            .iter()
            .map(|o| o.domain.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!("    - {} ({})", spec.alias.cyan(), origins);
    }

    println!("  DNS: {}個", manifest.dns.len());
    for spec in &manifest.dns {
        let health = if spec.health_check_path.is_some() {
            ", ヘルスチェックあり"
        } else {
            ""
        };
        println!("    - {} → {}{}", spec.domain.cyan(), spec.target, health);
    }

    println!("  ネットワーク: {}個", manifest.network.len());
    for spec in &manifest.network {
        let peering = if spec.peering.is_some() {
            ", ピアリングあり"
        } else {
            ""
        };
        println!(
            "    - {} ({}, {}個のサブネット, {}個のACL{})",
            spec.name.cyan(),
            spec.cidr_block,
            spec.subnets.len(),
            spec.acls.len(),
            peering
        );
    }

    if let Some(region) = &manifest.aws.region {
        println!("  リージョン: {}", region);
    }
}
