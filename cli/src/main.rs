use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{debug, info, warn};

use iban_registry_core::{
    BankRecord, IBAN_PREFIX_LENGTH, IbanRegistry, bic_country, build_iban, expand_bic, is_valid_bic,
    validate_bank_record,
};
use iban_registry_db::{BankDirectory, IbanStructureStore, RegistryConfig};
use iban_registry_parser::banks::{SUPPORTED_BANK_REGISTRIES, normalize_bank_registry, source_for_country};
use iban_registry_parser::report::ParseReport;
use iban_registry_parser::{
    OutputFormat, ParseError, format_bank_records, format_registry, format_report,
    parse_registry_text, parse_registry_text_with_report,
};

#[derive(Debug, Parser)]
#[command(name = "iban-registry")]
#[command(about = "Convert and query the IBAN structure and bank-code registries")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert the IBAN registry text export into the structure artifact.
    Iban(IbanArgs),
    /// Normalize national bank-code CSV exports into bank lists.
    Banks(BanksArgs),
    /// Check the generated structure artifact and bank lists.
    Validate(ValidateArgs),
    /// Look up a country's IBAN structure and its banks.
    Lookup(LookupArgs),
    /// Check an IBAN against the registry and a BIC's structure.
    Check(CheckArgs),
    /// Build an IBAN from a BBAN or from domestic bank and account codes.
    Build(BuildArgs),
}

#[derive(Debug, Args)]
struct IbanArgs {
    /// Registry text export (tab-separated). Reads stdin when omitted or `-`.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Output file (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    /// Output both the registry and the conversion report.
    #[arg(long)]
    with_report: bool,
}

#[derive(Debug, Args)]
struct BanksArgs {
    /// Bank registry export as COUNTRY=PATH (e.g. SI=si.csv). Repeatable.
    #[arg(long = "source", required = true, value_parser = parse_source)]
    sources: Vec<(String, PathBuf)>,
    /// Output directory for the normalized bank lists.
    #[arg(long)]
    output: PathBuf,
    /// Number of parallel jobs (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
}

#[derive(Debug, Args)]
struct RegistryArgs {
    /// Registry location config (YAML). Environment overrides still apply.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory with the generated structure artifact and overrides.
    #[arg(long)]
    iban_dir: Option<PathBuf>,
    /// Directory with the normalized bank lists.
    #[arg(long)]
    bank_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    #[command(flatten)]
    registry: RegistryArgs,
}

#[derive(Debug, Args)]
struct LookupArgs {
    /// ISO 3166 country code.
    #[arg(long)]
    country: String,
    /// Domestic bank code to resolve.
    #[arg(long)]
    bank_code: Option<String>,
    /// BIC (8 or 11 characters) to resolve.
    #[arg(long)]
    bic: Option<String>,
    #[command(flatten)]
    registry: RegistryArgs,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// IBAN in electronic or print format.
    #[arg(long, required_unless_present = "bic")]
    iban: Option<String>,
    /// BIC (8 or 11 characters).
    #[arg(long)]
    bic: Option<String>,
    #[command(flatten)]
    registry: RegistryArgs,
}

#[derive(Debug, Args)]
struct BuildArgs {
    /// ISO 3166 country code.
    #[arg(long)]
    country: String,
    /// Complete BBAN. Separators are ignored.
    #[arg(long, conflicts_with_all = ["bank_code", "branch_code", "account_code"])]
    bban: Option<String>,
    #[arg(long, required_unless_present = "bban")]
    bank_code: Option<String>,
    /// Omit for countries without a branch code.
    #[arg(long)]
    branch_code: Option<String>,
    #[arg(long, required_unless_present = "bban")]
    account_code: Option<String>,
    #[command(flatten)]
    registry: RegistryArgs,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::Iban(args) => run_iban(args),
        Command::Banks(args) => run_banks(args),
        Command::Validate(args) => run_validate(args),
        Command::Lookup(args) => run_lookup(args),
        Command::Check(args) => run_check(args),
        Command::Build(args) => run_build(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Installs a stderr `fmt` subscriber. `RUST_LOG` takes precedence over the
/// verbosity flags.
fn setup_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("iban_registry={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

// ---------------------------------------------------------------------------
// iban command
// ---------------------------------------------------------------------------

fn run_iban(args: IbanArgs) -> Result<(), String> {
    let raw = read_input(args.input.as_deref())?;

    let rendered = if args.with_report {
        let run = parse_registry_text_with_report(&raw).map_err(|e| e.to_string())?;
        for issue in &run.report.validation_issues {
            warn!(%issue, "structural issue");
        }
        format_with_report(&run.registry, &run.report, args.format)?
    } else {
        let registry = parse_registry_text(&raw).map_err(|e| e.to_string())?;
        format_registry(&registry, args.format)?
    };

    write_output(args.output.as_deref(), &rendered)
}

fn format_with_report(
    registry: &IbanRegistry,
    report: &ParseReport,
    format: OutputFormat,
) -> Result<String, String> {
    #[derive(serde::Serialize)]
    struct ParseOutput<'a> {
        registry: &'a IbanRegistry,
        report: &'a ParseReport,
    }

    let output = ParseOutput { registry, report };
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&output)
            .map_err(|e| format!("Failed to serialize output: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(&output).map_err(|e| format!("Failed to serialize output: {e}"))
        }
        OutputFormat::Markdown | OutputFormat::Table => {
            let mut out = format_registry(registry, format)?;
            out.push('\n');
            out.push_str(&format_report(report, format)?);
            Ok(out)
        }
    }
}

// ---------------------------------------------------------------------------
// banks command
// ---------------------------------------------------------------------------

fn run_banks(args: BanksArgs) -> Result<(), String> {
    use rayon::prelude::*;

    ensure_unique_sources(&args.sources)?;

    fs::create_dir_all(&args.output).map_err(|e| {
        format!(
            "Failed to create output directory '{}': {e}",
            args.output.display()
        )
    })?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.unwrap_or(0))
        .build()
        .map_err(|e| format!("Failed to create thread pool: {e}"))?;

    let output_dir = &args.output;
    let outcomes: Vec<Result<(String, usize, PathBuf), String>> = pool.install(|| {
        args.sources
            .par_iter()
            .map(|(country, path)| normalize_source(country, path, output_dir))
            .collect()
    });

    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok((country, count, path)) => println!("{country}: {count} banks -> {}", path.display()),
            Err(err) => failures.push(err),
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures.join("; "))
    }
}

fn normalize_source(
    country: &str,
    path: &Path,
    output_dir: &Path,
) -> Result<(String, usize, PathBuf), String> {
    let source = source_for_country(country)
        .ok_or_else(|| ParseError::UnsupportedRegistry(country.to_string()).to_string())?;
    let csv_text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {e}", path.display()))?;

    let banks = normalize_bank_registry(source.as_ref(), &csv_text)
        .map_err(|e| format!("{country}: {e}"))?;
    for issue in banks.iter().flat_map(validate_bank_record) {
        warn!(%issue, "bank record issue");
    }

    let json = format_bank_records(&banks, OutputFormat::Json)?;
    let out_path = output_dir.join(bank_list_file_name(source.country_code()));
    fs::write(&out_path, json)
        .map_err(|e| format!("Failed to write '{}': {e}", out_path.display()))?;

    debug!(country, path = %out_path.display(), "wrote bank list");
    Ok((source.country_code().to_string(), banks.len(), out_path))
}

/// Each country may appear once; its bank list file is shared.
fn ensure_unique_sources(sources: &[(String, PathBuf)]) -> Result<(), String> {
    let mut seen = BTreeSet::new();
    for (country, _) in sources {
        if !seen.insert(country.as_str()) {
            return Err(format!("bank registry '{country}' given more than once"));
        }
    }
    Ok(())
}

fn bank_list_file_name(country: &str) -> String {
    format!("generated_{}.json", country.to_ascii_lowercase())
}

fn parse_source(raw: &str) -> Result<(String, PathBuf), String> {
    let (country, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected COUNTRY=PATH, got '{raw}'"))?;
    let country = country.trim().to_ascii_uppercase();
    if !SUPPORTED_BANK_REGISTRIES.contains(&country.as_str()) {
        return Err(format!(
            "unsupported bank registry '{country}' (supported: {})",
            SUPPORTED_BANK_REGISTRIES.join(", ")
        ));
    }
    if path.trim().is_empty() {
        return Err(format!("missing path for {country}"));
    }
    Ok((country, PathBuf::from(path.trim())))
}

// ---------------------------------------------------------------------------
// validate command
// ---------------------------------------------------------------------------

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let config = resolve_config(&args.registry)?;

    let store = IbanStructureStore::load(&config).map_err(|e| e.to_string())?;
    let mut issues: Vec<String> = store.validate().iter().map(ToString::to_string).collect();
    println!("{} countries in {}", store.len(), store.source().display());

    if config.bank_registry_dir.is_dir() {
        let banks = BankDirectory::from_dir(&config.bank_registry_dir).map_err(|e| e.to_string())?;
        issues.extend(
            banks
                .records()
                .iter()
                .flat_map(validate_bank_record)
                .map(|issue| issue.to_string()),
        );
        for country in banks.countries() {
            if !store.contains(country) {
                issues.push(format!("{country}: bank list without IBAN structure"));
            }
        }
        println!("{} banks in {}", banks.len(), config.bank_registry_dir.display());
    } else {
        info!(dir = %config.bank_registry_dir.display(), "no bank registry directory");
    }

    for issue in &issues {
        println!("  {issue}");
    }

    if issues.is_empty() {
        println!("registry is valid");
        Ok(())
    } else {
        Err(format!("{} validation issue(s)", issues.len()))
    }
}

// ---------------------------------------------------------------------------
// lookup command
// ---------------------------------------------------------------------------

fn run_lookup(args: LookupArgs) -> Result<(), String> {
    let config = resolve_config(&args.registry)?;
    let country = args.country.trim().to_ascii_uppercase();

    let store = IbanStructureStore::load(&config).map_err(|e| e.to_string())?;
    let structure = store
        .get(&country)
        .ok_or_else(|| format!("no IBAN structure for '{country}'"))?;

    let banks: Option<Vec<BankRecord>> = if args.bank_code.is_some() || args.bic.is_some() {
        let directory =
            BankDirectory::from_dir(&config.bank_registry_dir).map_err(|e| e.to_string())?;
        let mut found: Vec<BankRecord> = Vec::new();
        if let Some(code) = &args.bank_code {
            found.extend(directory.get_by_country_bank_code(&country, code).into_iter().cloned());
        }
        if let Some(bic) = &args.bic {
            for bank in directory.get_by_bic(bic) {
                if !found.contains(bank) {
                    found.push(bank.clone());
                }
            }
        }
        Some(found)
    } else {
        None
    };

    let output = serde_json::json!({
        "country": country,
        "structure": structure,
        "banks": banks,
    });
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| format!("Failed to serialize output: {e}"))?;
    println!("{json}");
    Ok(())
}

// ---------------------------------------------------------------------------
// check / build commands
// ---------------------------------------------------------------------------

fn run_check(args: CheckArgs) -> Result<(), String> {
    let config = resolve_config(&args.registry)?;
    let mut output = serde_json::Map::new();
    let mut failures = 0;

    if let Some(input) = &args.iban {
        let store = IbanStructureStore::load(&config).map_err(|e| e.to_string())?;
        let result = match store.validate_iban(input) {
            Ok(iban) => {
                let country = &iban[..2];
                let parts = store
                    .get(country)
                    .and_then(|structure| structure.split_bban(&iban[IBAN_PREFIX_LENGTH..]));
                serde_json::json!({
                    "valid": true,
                    "iban": iban,
                    "country": country,
                    "bban": parts,
                })
            }
            Err(err) => {
                failures += 1;
                serde_json::json!({
                    "valid": false,
                    "input": input,
                    "error": err.to_string(),
                })
            }
        };
        output.insert("iban".to_string(), result);
    }

    if let Some(bic) = &args.bic {
        let valid = is_valid_bic(bic);
        if !valid {
            failures += 1;
        }
        let directory = if valid && config.bank_registry_dir.is_dir() {
            Some(BankDirectory::from_dir(&config.bank_registry_dir).map_err(|e| e.to_string())?)
        } else {
            None
        };
        let banks: Vec<&BankRecord> = directory
            .as_ref()
            .map(|directory| directory.get_by_bic(bic))
            .unwrap_or_default();
        output.insert(
            "bic".to_string(),
            serde_json::json!({
                "valid": valid,
                "bic": expand_bic(bic),
                "country": bic_country(bic),
                "banks": banks,
            }),
        );
    }

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| format!("Failed to serialize output: {e}"))?;
    println!("{json}");

    if failures == 0 {
        Ok(())
    } else {
        Err(format!("{failures} check(s) failed"))
    }
}

fn run_build(args: BuildArgs) -> Result<(), String> {
    let config = resolve_config(&args.registry)?;
    let country = args.country.trim().to_ascii_uppercase();
    let store = IbanStructureStore::load(&config).map_err(|e| e.to_string())?;

    let iban = match &args.bban {
        Some(bban) => {
            let iban = build_iban(&country, bban).map_err(|e| e.to_string())?;
            store.validate_iban(&iban).map_err(|e| e.to_string())?
        }
        None => store
            .build_iban(
                &country,
                args.bank_code.as_deref().unwrap_or_default(),
                args.branch_code.as_deref().unwrap_or_default(),
                args.account_code.as_deref().unwrap_or_default(),
            )
            .map_err(|e| e.to_string())?,
    };

    debug!(%country, %iban, "built IBAN");
    println!("{iban}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve_config(args: &RegistryArgs) -> Result<RegistryConfig, String> {
    let mut config = match &args.config {
        Some(path) => RegistryConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?
            .with_env_overrides(),
        None => RegistryConfig::from_env(),
    };
    if let Some(dir) = &args.iban_dir {
        config.iban_registry_dir = dir.clone();
    }
    if let Some(dir) = &args.bank_dir {
        config.bank_registry_dir = dir.clone();
    }
    Ok(config)
}

fn read_input(path: Option<&Path>) -> Result<String, String> {
    match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display())),
        _ => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(|err| format!("Failed to read stdin: {err}"))?;
            Ok(raw)
        }
    }
}

fn write_output(path: Option<&Path>, rendered: &str) -> Result<(), String> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create '{}': {e}", parent.display()))?;
            }
            fs::write(path, rendered)
                .map_err(|e| format!("Failed to write '{}': {e}", path.display()))?;
            info!(path = %path.display(), "wrote registry");
            Ok(())
        }
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_accepts_lowercase_country() {
        let (country, path) = parse_source("si=data/si.csv").unwrap();
        assert_eq!(country, "SI");
        assert_eq!(path, PathBuf::from("data/si.csv"));
    }

    #[test]
    fn test_parse_source_rejects_bad_input() {
        assert!(parse_source("SI").is_err());
        assert!(parse_source("DE=de.csv").is_err());
        assert!(parse_source("SK=").is_err());
    }

    #[test]
    fn test_duplicate_sources_rejected() {
        let sources = vec![
            ("SI".to_string(), PathBuf::from("a.csv")),
            ("SK".to_string(), PathBuf::from("sk.csv")),
            ("SI".to_string(), PathBuf::from("b.csv")),
        ];
        let err = ensure_unique_sources(&sources).unwrap_err();
        assert!(err.contains("'SI'"), "{err}");
        assert!(ensure_unique_sources(&sources[..2]).is_ok());
    }

    #[test]
    fn test_bank_list_file_name() {
        assert_eq!(bank_list_file_name("SK"), "generated_sk.json");
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from(["iban-registry", "-vv", "iban", "--format", "yaml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Command::Iban(IbanArgs { format: OutputFormat::Yaml, .. })
        ));
    }

    #[test]
    fn test_check_requires_iban_or_bic() {
        assert!(Cli::try_parse_from(["iban-registry", "check"]).is_err());
        assert!(Cli::try_parse_from(["iban-registry", "check", "--bic", "BSLJSI2X"]).is_ok());
    }

    #[test]
    fn test_build_bban_conflicts_with_codes() {
        let both = ["iban-registry", "build", "--country", "FR", "--bban", "1", "--bank-code", "1"];
        assert!(Cli::try_parse_from(both).is_err());
        assert!(Cli::try_parse_from(["iban-registry", "build", "--country", "FR"]).is_err());

        let cli = Cli::try_parse_from([
            "iban-registry",
            "build",
            "--country",
            "DE",
            "--bank-code",
            "37040044",
            "--account-code",
            "0532013000",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Build(BuildArgs { branch_code: None, bban: None, .. })
        ));
    }
}
