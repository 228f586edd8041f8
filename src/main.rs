//! money-pool CLI
//!
//! Keep a shared expense group in a JSON file and settle it from the
//! command line.
//!
//! # Usage
//!
//! ```bash
//! # Create a group and add members
//! money-pool new --name Flat --currency Euro --output flat.json
//! money-pool member --input flat.json alice bob carol
//!
//! # Record a purchase and a transfer
//! money-pool purchase --input flat.json --purchaser alice --recipients alice,bob,carol --amount 90
//! money-pool transfer --input flat.json --purchaser bob --recipient alice --amount 10
//!
//! # Show balances and the payments that settle them
//! money-pool settle --input flat.json
//! ```

use money_pool::core::currency::Currency;
use money_pool::core::error::LedgerError;
use money_pool::core::group::Group;
use money_pool::core::timestamp::TimeStamp;
use money_pool::prompt::{PromptError, StdinPrompter, ValueProvider};
use money_pool::simulation::random_group::{generate_random_group, GroupConfig};
use money_pool::store::document::{load, save, to_json};
use std::fmt::Display;
use std::process;
use std::str::FromStr;

fn print_usage() {
    eprintln!(
        r#"money-pool: shared expense ledger with greedy settlement

USAGE:
    money-pool <COMMAND> [OPTIONS]

COMMANDS:
    new          Create an empty group file
    member       Add members to a group
    purchase     Record a purchase split among recipients
    transfer     Record a direct transfer between two members
    rate         Set the exchange rate of a foreign currency
    show         Print the group summary and balances
    settle       Print the payments that settle the group
    interactive  Build or extend a group by answering prompts
    generate     Generate a random group (for testing)
    help         Show this message

OPTIONS (new):
    --name <NAME>           Group name
    --description <TEXT>    Group description
    --currency <CURRENCY>   Group currency (default: Euro)
    --output <FILE>         Group file to create

OPTIONS (member):
    --input <FILE>          Group file
    <NAME>...               Names of the new members

OPTIONS (purchase, transfer):
    --input <FILE>          Group file
    --title <TITLE>         Entry title
    --purchaser <NAME>      Member who paid
    --recipients <A,B,..>   Members the purchase was for (purchase)
    --recipient <NAME>      Member who received the money (transfer)
    --amount <AMOUNT>       Amount paid
    --currency <CURRENCY>   Currency of the amount (default: group currency)
    --date <DATE>           dd.MM.yyyy or "dd.MM.yyyy HH:mm:ss" (default: now)

OPTIONS (rate):
    --input <FILE>          Group file
    --currency <CURRENCY>   Foreign currency
    --rate <RATE>           Units of that currency per unit of group currency

OPTIONS (show, settle):
    --input <FILE>          Group file
    --format <FORMAT>       Output format: text (default) or json
    --apply                 Record the settlement payments as transfers (settle)

OPTIONS (interactive):
    --input <FILE>          Group file to extend (default: start a new group)
    --output <FILE>         Where to save (default: the input file)

OPTIONS (generate):
    --members <N>           Number of members (default: 6)
    --purchases <N>         Number of purchases (default: 30)
    --transfers <N>         Number of transfers (default: 5)
    --output <FILE>         Write to file instead of stdout

EXAMPLES:
    money-pool new --name Flat --output flat.json
    money-pool member --input flat.json alice bob
    money-pool purchase --input flat.json --purchaser alice --recipients alice,bob --amount 42.50
    money-pool rate --input flat.json --currency USD --rate 1.19
    money-pool settle --input flat.json --apply
    money-pool generate --members 20 --purchases 100 --output random.json"#
    );
}

fn fail(message: impl Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Value following the flag at `args[*i]`; advances `i` past it.
fn option_value(args: &[String], i: &mut usize) -> String {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .cloned()
        .unwrap_or_else(|| fail(format!("{} requires a value", flag)))
}

fn parse_value<T>(text: &str, what: &str) -> T
where
    T: FromStr,
    T::Err: Display,
{
    text.parse()
        .unwrap_or_else(|e| fail(format!("invalid {} '{}': {}", what, text, e)))
}

fn load_group(path: &str) -> Group {
    load(path).unwrap_or_else(|e| fail(format!("cannot load '{}': {}", path, e)))
}

fn save_group(group: &Group, path: &str) {
    save(group, path).unwrap_or_else(|e| fail(format!("cannot save '{}': {}", path, e)));
}

fn cmd_new(args: &[String]) {
    let mut name = None;
    let mut description = String::new();
    let mut currency = Currency::default();
    let mut output_path = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--name" => name = Some(option_value(args, &mut i)),
            "--description" => description = option_value(args, &mut i),
            "--currency" => currency = parse_value(&option_value(args, &mut i), "currency"),
            "--output" => output_path = Some(option_value(args, &mut i)),
            _ => fail(format!("unknown option: {}", args[i])),
        }
        i += 1;
    }

    let name = name.unwrap_or_else(|| fail("--name <NAME> is required"));
    let path = output_path.unwrap_or_else(|| fail("--output <FILE> is required"));
    let group = Group::new(name, description, currency);
    save_group(&group, &path);
    eprintln!("Created group {} -> {}", group, path);
}

fn cmd_member(args: &[String]) {
    let mut input_path = None;
    let mut names = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => input_path = Some(option_value(args, &mut i)),
            flag if flag.starts_with("--") => fail(format!("unknown option: {}", flag)),
            name => names.push(name.to_string()),
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| fail("--input <FILE> is required"));
    if names.is_empty() {
        fail("at least one member name is required");
    }

    let mut group = load_group(&path);
    for name in names {
        group
            .add_member(name.as_str())
            .unwrap_or_else(|e| fail(e));
    }
    save_group(&group, &path);
}

/// Options shared by `purchase` and `transfer`.
#[derive(Default)]
struct EntryOptions {
    input_path: Option<String>,
    title: String,
    purchaser: Option<String>,
    recipients: Vec<String>,
    amount: Option<f64>,
    currency: Option<Currency>,
    date: Option<TimeStamp>,
}

fn parse_entry_options(args: &[String], recipient_flag: &str) -> EntryOptions {
    let mut options = EntryOptions::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => options.input_path = Some(option_value(args, &mut i)),
            "--title" => options.title = option_value(args, &mut i),
            "--purchaser" => options.purchaser = Some(option_value(args, &mut i)),
            "--amount" => {
                options.amount = Some(parse_value(&option_value(args, &mut i), "amount"))
            }
            "--currency" => {
                options.currency = Some(parse_value(&option_value(args, &mut i), "currency"))
            }
            "--date" => options.date = Some(parse_value(&option_value(args, &mut i), "date")),
            flag if flag == recipient_flag => {
                options.recipients = option_value(args, &mut i)
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            _ => fail(format!("unknown option: {}", args[i])),
        }
        i += 1;
    }
    options
}

fn cmd_purchase(args: &[String]) {
    let options = parse_entry_options(args, "--recipients");
    let path = options
        .input_path
        .unwrap_or_else(|| fail("--input <FILE> is required"));
    let purchaser = options
        .purchaser
        .unwrap_or_else(|| fail("--purchaser <NAME> is required"));
    let amount = options
        .amount
        .unwrap_or_else(|| fail("--amount <AMOUNT> is required"));

    let mut group = load_group(&path);
    let currency = options.currency.unwrap_or(group.currency());
    let date = options.date.unwrap_or_else(TimeStamp::now);
    group
        .add_purchase(
            &options.title,
            &purchaser,
            options.recipients.as_slice(),
            amount,
            currency,
            date,
        )
        .unwrap_or_else(|e| fail(e));
    save_group(&group, &path);
}

fn cmd_transfer(args: &[String]) {
    let options = parse_entry_options(args, "--recipient");
    let path = options
        .input_path
        .unwrap_or_else(|| fail("--input <FILE> is required"));
    let purchaser = options
        .purchaser
        .unwrap_or_else(|| fail("--purchaser <NAME> is required"));
    let amount = options
        .amount
        .unwrap_or_else(|| fail("--amount <AMOUNT> is required"));
    let recipient = match options.recipients.as_slice() {
        [only] => only.clone(),
        _ => fail("--recipient takes exactly one member name"),
    };

    let mut group = load_group(&path);
    let currency = options.currency.unwrap_or(group.currency());
    let date = options.date.unwrap_or_else(TimeStamp::now);
    group
        .add_transfer(&options.title, &purchaser, &recipient, amount, currency, date)
        .unwrap_or_else(|e| fail(e));
    save_group(&group, &path);
}

fn cmd_rate(args: &[String]) {
    let mut input_path = None;
    let mut currency = None;
    let mut rate = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => input_path = Some(option_value(args, &mut i)),
            "--currency" => {
                currency = Some(parse_value::<Currency>(&option_value(args, &mut i), "currency"))
            }
            "--rate" => rate = Some(parse_value::<f64>(&option_value(args, &mut i), "rate")),
            _ => fail(format!("unknown option: {}", args[i])),
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| fail("--input <FILE> is required"));
    let currency = currency.unwrap_or_else(|| fail("--currency <CURRENCY> is required"));
    let rate = rate.unwrap_or_else(|| fail("--rate <RATE> is required"));

    let mut group = load_group(&path);
    group
        .set_exchange_rate(currency, rate)
        .unwrap_or_else(|e| fail(e));
    save_group(&group, &path);
}

/// Parses `--input`, `--format` and (when allowed) `--apply`.
fn parse_view_options(args: &[String], allow_apply: bool) -> (String, String, bool) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut apply = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => input_path = Some(option_value(args, &mut i)),
            "--format" => format = option_value(args, &mut i),
            "--apply" if allow_apply => apply = true,
            _ => fail(format!("unknown option: {}", args[i])),
        }
        i += 1;
    }
    if format != "text" && format != "json" {
        fail("--format requires 'text' or 'json'");
    }
    let path = input_path.unwrap_or_else(|| fail("--input <FILE> is required"));
    (path, format, apply)
}

fn cmd_show(args: &[String]) {
    let (path, format, _) = parse_view_options(args, false);
    let group = load_group(&path);

    if format == "json" {
        let report = group.report().unwrap_or_else(|e| fail(e));
        let json = serde_json::to_string_pretty(&report).unwrap_or_else(|e| fail(e));
        println!("{}", json);
    } else {
        let summary = group.summary().unwrap_or_else(|e| fail(e));
        let report = group.report().unwrap_or_else(|e| fail(e));
        println!("{}", summary);
        println!("{}", report);
    }
}

fn cmd_settle(args: &[String]) {
    let (path, format, apply) = parse_view_options(args, true);
    let mut group = load_group(&path);
    let plan = group.settlement_plan().unwrap_or_else(|e| fail(e));

    if format == "json" {
        let json = serde_json::to_string_pretty(&plan).unwrap_or_else(|e| fail(e));
        println!("{}", json);
    } else {
        println!("{}", plan);
    }

    if apply {
        let recorded = group.settle_all().unwrap_or_else(|e| fail(e));
        save_group(&group, &path);
        eprintln!("Recorded {} settlement transfers in {}", recorded.len(), path);
    }
}

fn cmd_interactive(args: &[String]) {
    let mut input_path = None;
    let mut output_path = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => input_path = Some(option_value(args, &mut i)),
            "--output" => output_path = Some(option_value(args, &mut i)),
            _ => fail(format!("unknown option: {}", args[i])),
        }
        i += 1;
    }

    let existing = input_path.as_deref().map(load_group);
    let mut prompter = StdinPrompter::stdin();
    let group = run_session(&mut prompter, existing).unwrap_or_else(|e| fail(e));

    match output_path.or(input_path) {
        Some(path) => save_group(&group, &path),
        None => {
            let json = to_json(&group).unwrap_or_else(|e| fail(e));
            println!("{}", json);
        }
    }
}

/// Ask until the answer parses as `T`.
fn ask<T, P>(
    provider: &mut P,
    description: &str,
    default: Option<&str>,
    options: &[&str],
) -> Result<T, PromptError>
where
    P: ValueProvider,
    T: FromStr,
    T::Err: Display,
{
    loop {
        let answer = provider.value(description, default, options)?;
        match answer.parse() {
            Ok(value) => return Ok(value),
            Err(e) => eprintln!("Invalid value '{}': {}", answer, e),
        }
    }
}

const ACTIONS: [&str; 7] = [
    "member", "purchase", "transfer", "rate", "show", "settle", "done",
];

/// Create or extend a group by asking `provider` for every value.
///
/// A rejected value skips the current action and returns to the action
/// prompt. Running out of input ends the session with an error.
fn run_session<P: ValueProvider>(
    provider: &mut P,
    existing: Option<Group>,
) -> Result<Group, PromptError> {
    let mut group = match existing {
        Some(group) => group,
        None => {
            let name = provider.value("Group name", None, &[])?;
            let description = provider.value("Description", Some(""), &[])?;
            let currency: Currency = ask(
                provider,
                "Currency",
                Some(Currency::default().name()),
                &Currency::names(),
            )?;
            Group::new(name, description, currency)
        }
    };

    loop {
        let action = provider.value("Action", Some("done"), &ACTIONS)?;
        let outcome = match action.as_str() {
            "member" => session_member(provider, &mut group),
            "purchase" => session_entry(provider, &mut group, false),
            "transfer" => session_entry(provider, &mut group, true),
            "rate" => session_rate(provider, &mut group),
            "show" => group
                .summary()
                .map(|s| println!("{}", s))
                .map_err(SessionStep::from),
            "settle" => group
                .settlement_plan()
                .map(|p| println!("{}", p))
                .map_err(SessionStep::from),
            "done" => break,
            other => Err(SessionStep::Rejected(format!("unknown action '{}'", other))),
        };
        match outcome {
            Ok(()) => {}
            Err(SessionStep::Abort(e)) => return Err(e),
            Err(SessionStep::Rejected(message)) => eprintln!("Rejected: {}", message),
        }
    }

    Ok(group)
}

/// Why an interactive action did not complete.
enum SessionStep {
    Rejected(String),
    Abort(PromptError),
}

impl From<PromptError> for SessionStep {
    fn from(e: PromptError) -> Self {
        match e {
            PromptError::Required(_) => SessionStep::Rejected(e.to_string()),
            other => SessionStep::Abort(other),
        }
    }
}

impl From<LedgerError> for SessionStep {
    fn from(e: LedgerError) -> Self {
        SessionStep::Rejected(e.to_string())
    }
}

fn session_member<P: ValueProvider>(provider: &mut P, group: &mut Group) -> Result<(), SessionStep> {
    let name = provider.value("Member name", None, &[])?;
    group.add_member(name)?;
    Ok(())
}

fn session_entry<P: ValueProvider>(
    provider: &mut P,
    group: &mut Group,
    transfer: bool,
) -> Result<(), SessionStep> {
    let names: Vec<String> = group.member_names().iter().map(|n| n.to_string()).collect();
    let options: Vec<&str> = names.iter().map(String::as_str).collect();
    let everyone = names.join(",");
    let currency_default = group.currency().name();
    let now = TimeStamp::now().to_string();

    let title = provider.value("Title", Some(""), &[])?;
    let purchaser = provider.value("Purchaser", None, &options)?;
    let recipients = if transfer {
        provider.value("Recipient", None, &options)?
    } else {
        provider.value("Recipients", Some(everyone.as_str()), &options)?
    };
    let amount: f64 = ask(provider, "Amount", None, &[])?;
    let currency: Currency = ask(provider, "Currency", Some(currency_default), &Currency::names())?;
    let date: TimeStamp = ask(provider, "Date", Some(now.as_str()), &[])?;

    if transfer {
        group.add_transfer(&title, &purchaser, &recipients, amount, currency, date)?;
    } else {
        let recipients: Vec<&str> = recipients
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        group.add_purchase(&title, &purchaser, recipients.as_slice(), amount, currency, date)?;
    }
    Ok(())
}

fn session_rate<P: ValueProvider>(provider: &mut P, group: &mut Group) -> Result<(), SessionStep> {
    let foreign: Vec<&str> = Currency::names()
        .into_iter()
        .filter(|n| *n != group.currency().name())
        .collect();
    let currency: Currency = ask(provider, "Currency", None, &foreign)?;
    let rate: f64 = ask(provider, "Rate", None, &[])?;
    group.set_exchange_rate(currency, rate)?;
    Ok(())
}

fn cmd_generate(args: &[String]) {
    let mut config = GroupConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--members" => {
                config.member_count = parse_value(&option_value(args, &mut i), "member count")
            }
            "--purchases" => {
                config.purchase_count = parse_value(&option_value(args, &mut i), "purchase count")
            }
            "--transfers" => {
                config.transfer_count = parse_value(&option_value(args, &mut i), "transfer count")
            }
            "--output" => output_path = Some(option_value(args, &mut i)),
            _ => fail(format!("unknown option: {}", args[i])),
        }
        i += 1;
    }

    let group = generate_random_group(&config).unwrap_or_else(|e| fail(e));

    if let Some(path) = output_path {
        save_group(&group, &path);
        eprintln!(
            "Generated {} purchases across {} members -> {}",
            config.purchase_count, config.member_count, path
        );
    } else {
        let json = to_json(&group).unwrap_or_else(|e| fail(e));
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "new" => cmd_new(rest),
        "member" => cmd_member(rest),
        "purchase" => cmd_purchase(rest),
        "transfer" => cmd_transfer(rest),
        "rate" => cmd_rate(rest),
        "show" => cmd_show(rest),
        "settle" => cmd_settle(rest),
        "interactive" => cmd_interactive(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use money_pool::prompt::ScriptedPrompter;

    #[test]
    fn test_session_builds_group() {
        let mut prompter = ScriptedPrompter::new([
            "Trip", "Summer", "", // name, description, currency
            "member", "alice", //
            "member", "bob", //
            "purchase", "Dinner", "alice", "", "60", "", "01.07.2024", //
            "transfer", "", "bob", "alice", "10", "", "02.07.2024", //
            "done",
        ]);
        let group = run_session(&mut prompter, None).unwrap();

        assert_eq!(group.name(), "Trip");
        assert_eq!(group.currency(), Currency::Euro);
        assert_eq!(group.member_names(), vec!["alice", "bob"]);
        assert_eq!(group.purchases().count(), 1);
        assert_eq!(group.transfers().count(), 1);
        assert_eq!(group.balance("alice").unwrap(), 20.0);
        assert_eq!(group.balance("bob").unwrap(), -20.0);
    }

    #[test]
    fn test_session_rejects_and_continues() {
        let mut group = Group::new("Flat", "", Currency::Euro);
        group.add_member("alice").unwrap();
        let mut prompter = ScriptedPrompter::new([
            "member", "alice", // duplicate, rejected
            "member", "", // blank, rejected
            "rate", "USD", "abc", "1.19", // bad number is asked again
            "dance", // unknown action
            "",      // defaults to done
        ]);
        let group = run_session(&mut prompter, Some(group)).unwrap();

        assert_eq!(group.member_count(), 1);
        assert_eq!(group.exchange_rate(Currency::USD), Some(1.19));
    }

    #[test]
    fn test_session_ends_with_input() {
        let mut prompter = ScriptedPrompter::new(["Trip", "", "", "member"]);
        assert!(matches!(
            run_session(&mut prompter, None),
            Err(PromptError::Closed(_))
        ));
    }
}
