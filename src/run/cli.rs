use anyhow::Result;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::budget;
use crate::db::{Database, DeleteCategoryOutcome};
use crate::models::{Category, Expense};
use crate::notify::{ConsoleNotifier, Notifier};

pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    match args[1].as_str() {
        "add" => cli_add(&args[2..], db),
        "expenses" | "ls" => cli_expenses(&args[2..], db),
        "rm" => cli_remove_expense(&args[2..], db),
        "categories" => cli_categories(db),
        "category" => cli_category(&args[2..], db),
        "import" => cli_import(&args[2..], db),
        "export" => cli_export(&args[2..], db),
        "summary" | "s" => cli_summary(&args[2..], db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("centime {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

pub(crate) fn print_usage() {
    println!("Centime — local-only personal expense tracker");
    println!();
    println!("Usage: centime <command>");
    println!();
    println!("Commands:");
    println!("  add <label> <amount> <date> <category>   Record an expense (date: YYYY-MM-DD)");
    println!("  expenses                                 List expenses");
    println!("    --month <YYYY-MM>                      Only this month");
    println!("    --category <name>                      Only this category");
    println!("  rm <id>                                  Delete an expense");
    println!("  categories                               List categories");
    println!("  category add <name> [--limit <amount>] [--color <hex>]");
    println!("  category set <id> [--name <n>] [--limit <amount|none>] [--color <hex|none>]");
    println!("  category rm <id>                         Delete a category (refused while it has expenses)");
    println!("  import <file.csv>                        Import expenses (label,amount,date,category)");
    println!("  export [path]                            Export expenses to CSV");
    println!("    --month <YYYY-MM>                      Month to export (default: current)");
    println!("  summary [YYYY-MM]                        Per-category spend vs. limit");
    println!("  --help, -h                               Show this help");
    println!("  --version, -V                            Show version");
}

fn cli_add(args: &[String], db: &mut Database) -> Result<()> {
    if args.len() < 4 {
        anyhow::bail!("Usage: centime add <label> <amount> <date> <category>");
    }

    let amount = Decimal::from_str(&args[1].replace(',', "."))
        .map_err(|_| anyhow::anyhow!("Invalid amount: {}", args[1]))?;

    let category = db
        .find_category_by_name(&args[3])?
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Category '{}' not found. Create it with: centime category add \"{}\"",
                args[3],
                args[3]
            )
        })?;
    let category_id = category
        .id
        .ok_or_else(|| anyhow::anyhow!("Category has no ID"))?;

    let expense = Expense::new(args[0].clone(), amount, args[2].clone(), category_id);
    let (recorded, breach) = budget::record_expense(db, expense)?;
    println!(
        "Recorded #{}: {} {} on {} ({})",
        recorded.id.unwrap_or(0),
        recorded.label,
        recorded.amount,
        recorded.date,
        category.name,
    );

    if let Some(breach) = breach {
        ConsoleNotifier.notify(&breach.to_notification());
    }
    Ok(())
}

fn cli_expenses(args: &[String], db: &mut Database) -> Result<()> {
    let month = args
        .windows(2)
        .find(|w| w[0] == "--month")
        .map(|w| w[1].as_str());
    let category_id = match args.windows(2).find(|w| w[0] == "--category") {
        Some(w) => {
            let cat = db
                .find_category_by_name(&w[1])?
                .ok_or_else(|| anyhow::anyhow!("Category '{}' not found", w[1]))?;
            cat.id
        }
        None => None,
    };

    let expenses = db.get_expenses(category_id, month)?;
    if expenses.is_empty() {
        println!("No expenses");
        return Ok(());
    }

    let categories = db.get_categories()?;
    println!("{:<6} {:<12} {:>10}  {:<18} Label", "ID", "Date", "Amount", "Category");
    println!("{}", "─".repeat(70));
    for expense in &expenses {
        let category = Category::find_by_id(&categories, expense.category_id)
            .map(|c| c.name.as_str())
            .unwrap_or("?");
        println!(
            "{:<6} {:<12} {:>10}  {:<18} {}",
            expense.id.unwrap_or(0),
            expense.date,
            expense.amount,
            category,
            expense.label,
        );
    }
    Ok(())
}

fn cli_remove_expense(args: &[String], db: &mut Database) -> Result<()> {
    let id = parse_id(args, "Usage: centime rm <expense-id>")?;
    if db.delete_expense(id)? {
        println!("Deleted expense {id}");
    } else {
        println!("No expense with id {id}");
    }
    Ok(())
}

fn cli_categories(db: &mut Database) -> Result<()> {
    let categories = db.get_categories()?;
    if categories.is_empty() {
        println!("No categories");
        return Ok(());
    }

    println!("{:<6} {:<24} {:>12}  Color", "ID", "Name", "Limit");
    println!("{}", "─".repeat(55));
    for cat in &categories {
        let limit = cat
            .monthly_limit
            .map(|l| l.to_string())
            .unwrap_or_else(|| "—".into());
        println!(
            "{:<6} {:<24} {:>12}  {}",
            cat.id.unwrap_or(0),
            cat.name,
            limit,
            cat.color.as_deref().unwrap_or(""),
        );
    }
    Ok(())
}

fn cli_category(args: &[String], db: &mut Database) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("add") => cli_category_add(&args[1..], db),
        Some("set") => cli_category_set(&args[1..], db),
        Some("rm") => cli_category_remove(&args[1..], db),
        _ => anyhow::bail!("Usage: centime category <add|set|rm> ..."),
    }
}

fn cli_category_add(args: &[String], db: &mut Database) -> Result<()> {
    let name = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .ok_or_else(|| anyhow::anyhow!("Usage: centime category add <name> [--limit <amount>] [--color <hex>]"))?;

    let mut category = Category::new(name.clone());
    if let Some(limit) = flag_value(args, "--limit") {
        category.monthly_limit = Some(parse_limit(limit)?);
    }
    category.color = flag_value(args, "--color").map(str::to_string);

    let id = db.insert_category(&category)?;
    println!("Created category #{id}: {name}");
    Ok(())
}

fn cli_category_set(args: &[String], db: &mut Database) -> Result<()> {
    let id = parse_id(args, "Usage: centime category set <id> [--name <n>] [--limit <amount|none>] [--color <hex|none>]")?;

    let mut category = db
        .get_category_by_id(id)?
        .ok_or_else(|| anyhow::anyhow!("Category {id} not found"))?;

    if let Some(name) = flag_value(args, "--name") {
        category.name = name.to_string();
    }
    match flag_value(args, "--limit") {
        Some("none") => category.monthly_limit = None,
        Some(raw) => category.monthly_limit = Some(parse_limit(raw)?),
        None => {}
    }
    match flag_value(args, "--color") {
        Some("none") => category.color = None,
        Some(raw) => category.color = Some(raw.to_string()),
        None => {}
    }

    db.update_category(&category)?;
    println!("Updated category #{id}: {}", category.name);
    Ok(())
}

fn cli_category_remove(args: &[String], db: &mut Database) -> Result<()> {
    let id = parse_id(args, "Usage: centime category rm <id>")?;

    // Early feedback; the store re-checks inside its own transaction.
    let expenses = db.get_expenses(None, None)?;
    if !Category::can_delete(id, &expenses) {
        println!("Category {id} still has expenses; delete or reassign them first.");
        return Ok(());
    }

    match db.delete_category(id)? {
        DeleteCategoryOutcome::Deleted => println!("Deleted category {id}"),
        DeleteCategoryOutcome::NotFound => println!("No category with id {id}"),
        DeleteCategoryOutcome::HasExpenses { expense_count } => {
            println!("Category {id} still has {expense_count} expense(s); not deleting.");
        }
    }
    Ok(())
}

fn cli_import(args: &[String], db: &mut Database) -> Result<()> {
    if args.is_empty() {
        anyhow::bail!("Usage: centime import <file.csv>");
    }

    let path = Path::new(&args[0]);
    if !path.exists() {
        anyhow::bail!("File not found: {}", args[0]);
    }

    let outcome = crate::import::import_file(db, path, &ConsoleNotifier)?;
    println!("Imported {} expenses", outcome.imported);
    Ok(())
}

fn cli_export(args: &[String], db: &mut Database) -> Result<()> {
    let month = args
        .windows(2)
        .find(|w| w[0] == "--month")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m").to_string());

    // Output path is the first non-flag argument
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/centime-export-{month}.csv")
        });

    let count = db.export_to_csv(&output_path, Some(&month))?;
    if count == 0 {
        println!("No expenses for {month}");
    } else {
        println!("Exported {count} expenses to {output_path}");
    }
    Ok(())
}

fn cli_summary(args: &[String], db: &mut Database) -> Result<()> {
    let month = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .cloned()
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m").to_string());

    let categories = db.get_categories()?;
    if categories.is_empty() {
        println!("No categories");
        return Ok(());
    }

    println!("Centime — {month}");
    println!("{:<24} {:>10} {:>12}", "Category", "Spent", "Limit");
    println!("{}", "─".repeat(50));
    let mut total = Decimal::ZERO;
    for cat in &categories {
        let Some(id) = cat.id else { continue };
        let spent = db.sum_for_category_and_month(id, &month)?;
        total += spent;
        let limit = cat
            .monthly_limit
            .map(|l| l.to_string())
            .unwrap_or_else(|| "—".into());
        let marker = match cat.monthly_limit {
            Some(l) if spent > l => "  over limit!",
            _ => "",
        };
        println!("{:<24} {:>10} {:>12}{marker}", cat.name, spent, limit);
    }
    println!("{}", "─".repeat(50));
    println!("{:<24} {:>10}", "Total", total);
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────

fn parse_id(args: &[String], usage: &str) -> Result<i64> {
    args.first()
        .and_then(|a| a.parse::<i64>().ok())
        .ok_or_else(|| anyhow::anyhow!("{usage}"))
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_limit(raw: &str) -> Result<Decimal> {
    let limit = Decimal::from_str(&raw.replace(',', "."))
        .map_err(|_| anyhow::anyhow!("Invalid limit: {raw}"))?;
    if limit < Decimal::ZERO {
        anyhow::bail!("Limit must not be negative: {raw}");
    }
    Ok(limit)
}

fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
