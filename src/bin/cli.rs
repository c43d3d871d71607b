use clap::Parser;
use lazy_params::{Expression, Variable};
use std::process;
use tracing::Level;

#[derive(Parser)]
#[command(name = "lazy-params")]
#[command(about = "Evaluate a parameter expression and list its dependencies")]
#[command(version)]
struct Args {
    /// Expression to evaluate, e.g. "x*y + 1"
    expression: String,

    /// Variable bindings as name=value pairs
    bindings: Vec<String>,

    /// Log parsing and evaluation details
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            Level::TRACE
        } else {
            Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    match evaluate(&args.expression, &args.bindings) {
        Ok((value, names)) => {
            println!("{} = {}", args.expression, value);
            println!("depends on: {}", names.join(", "));
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn evaluate(
    expression: &str,
    bindings: &[String],
) -> Result<(f64, Vec<String>), Box<dyn std::error::Error>> {
    let variables = bindings
        .iter()
        .map(|binding| parse_binding(binding))
        .collect::<Result<Vec<_>, _>>()?;

    let expr = Expression::new(expression, &variables)?;
    Ok((expr.eval()?, expr.variable_names()))
}

fn parse_binding(binding: &str) -> Result<Variable, Box<dyn std::error::Error>> {
    let (name, value) = binding
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{binding}`"))?;
    let value = evalexpr::Value::from(value.trim());
    Ok(Variable::from_value(name.trim(), &value)?)
}
