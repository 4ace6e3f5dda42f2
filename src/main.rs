// src/main.rs
// 用法: ecode-roundtrip <protocol> <config.json> [dt_ms] [tend_ms]
// 根据配置生成理想刺激波形，再重新解析，输出恢复的刺激参数 (JSON)
use std::env;
use std::fs;
use anyhow::{anyhow, Context, Result};
use log::info;
use neuro_ecode::{lookup, ConfigData, Ecode, EcodeKind, ReaderData, Trace};
const DEFAULT_DT_MS: f64 = 0.25;
const DEFAULT_TEND_MS: f64 = 3000.0;
fn parse_ms(arg: Option<String>, default: f64, label: &str) -> Result<f64> {
    match arg {
        Some(raw) => raw
            .parse::<f64>()
            .with_context(|| format!("invalid {label}: {raw}")),
        None => Ok(default),
    }
}
fn main() -> Result<()> {
    env_logger::init();
    let mut args = env::args().skip(1);
    let usage = "usage: ecode-roundtrip <protocol> <config.json> [dt_ms] [tend_ms]";
    let protocol = args.next().ok_or_else(|| anyhow!(usage))?;
    let config_path = args.next().ok_or_else(|| anyhow!(usage))?;
    let dt = parse_ms(args.next(), DEFAULT_DT_MS, "dt_ms")?;
    let tend = parse_ms(args.next(), DEFAULT_TEND_MS, "tend_ms")?;
    let kind = lookup(&protocol)?;
    let raw = fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read config file {config_path}"))?;
    let config: ConfigData =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {config_path}"))?;
    let reader = ReaderData::new();
    let source = Ecode::from_config(kind, protocol.as_str(), &config, &reader, dt, tend)?;
    let (t, signal) = source.generate().context("failed to generate the stimulus")?;
    info!("{protocol}: generated {} samples ({kind:?})", t.len());
    // 电压钳协议解析的是指令电压
    let trace = if kind == EcodeKind::VClampStep {
        Trace::new(t, None, Some(signal))?
    } else {
        Trace::new(t, Some(signal), None)?
    };
    let recovered = Ecode::interpret(kind, protocol.as_str(), &trace, &config, &reader)
        .context("failed to interpret the generated stimulus")?;
    let params = recovered.stimulus_parameters()?;
    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}
