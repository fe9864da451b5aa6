mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;

use cli::Args;
use sheetsift::export;
use sheetsift::{Operator, Session, SubsetId, VariableId};

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut session = Session::new();
    if let Err(e) = session.load_path(&args.path) {
        log::error!("Failed to load workbook: {e:#}");
        return Err(e).with_context(|| format!("loading {}", args.path.display()));
    }

    if args.catalog {
        print_catalog(&session);
    }
    if args.comments {
        print_comments(&session);
    }

    let ids = create_subsets(&mut session, &args.filters)?;
    let view = session.filtered(&ids)?;
    eprintln!(
        "{} of {} points selected",
        view.table.len(),
        session.table()?.len()
    );

    if args.parcoords {
        let vars = if args.vars.is_empty() {
            None
        } else {
            Some(
                args.vars
                    .iter()
                    .map(|label| resolve(&session, label))
                    .collect::<Result<Vec<_>>>()?,
            )
        };
        let data = session.parallel_coordinates(&ids, vars.as_deref())?;
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else if let Some(axes) = &args.scatter {
        let x = resolve(&session, &axes[0])?;
        let y = resolve(&session, &axes[1])?;
        let z = axes.get(2).map(|label| resolve(&session, label)).transpose()?;
        let data = session.scatter(&ids, &x, &y, z.as_ref())?;
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        println!("{}", export::pretty(&view.table)?);
    }

    if let Some(path) = &args.export {
        export::export_path(&view.table, path)
            .with_context(|| format!("exporting to {}", path.display()))?;
    }
    Ok(())
}

fn resolve(session: &Session, label: &str) -> Result<VariableId> {
    match session.find_variable(label) {
        Some(id) => Ok(id),
        None => bail!("Unknown variable '{label}' (see --catalog)"),
    }
}

/// `--where` values come in VARIABLE OP CRITERION triples; ids count from 1.
fn create_subsets(session: &mut Session, filters: &[String]) -> Result<Vec<SubsetId>> {
    let mut ids = Vec::new();
    for (i, triple) in filters.chunks(3).enumerate() {
        let [label, op, criterion] = triple else {
            bail!("--where needs VARIABLE OP CRITERION");
        };
        let variable = resolve(session, label)?;
        let operator: Operator = op.parse().map_err(anyhow::Error::msg)?;
        let id = i as SubsetId + 1;
        let subset = session
            .create_subset(id, &variable, operator, criterion)
            .with_context(|| format!("subset '{label} {op} {criterion}' rejected"))?;
        log::info!("Subset {id}: {}", subset.text);
        ids.push(id);
    }
    Ok(ids)
}

fn print_catalog(session: &Session) {
    println!("Variables:");
    for var in session.variables() {
        println!("  {}", var.label);
    }
    let symbols: Vec<&str> = session.operators().iter().map(|o| o.symbol).collect();
    println!("Operators: {}", symbols.join(" "));
}

fn print_comments(session: &Session) {
    let Some(wb) = session.workbook() else {
        return;
    };
    for sheet in &wb.sheets {
        match &sheet.comment {
            Some(text) => println!("[{}]\n{text}", sheet.name),
            None => println!("[{}] (no comment)", sheet.name),
        }
    }
}
