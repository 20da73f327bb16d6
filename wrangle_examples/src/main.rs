// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tutorial-style pipelines over a small flights dataset.
//!
//! Each section runs one family of verbs and prints the result. Set
//! `RUST_LOG` to control the per-stage log events (default
//! `wrangle_examples=info`).

mod data;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};
use wrangle_core::{Table, TableId};
use wrangle_transforms::{
    JoinKind, JoinOps, JoinOptions, PivotLongerSpec, PivotOps, PivotWiderSpec, Program, Selector,
    TableVerbs, Transform, case_when, col, desc, if_else, lit, n,
};

/// Which part of the tour to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Section {
    All,
    Select,
    Filter,
    Mutate,
    Arrange,
    Summarize,
    Join,
    Pivot,
    Program,
}

#[derive(Debug, Parser)]
#[command(name = "wrangle-examples")]
#[command(about = "Runs data-wrangling pipelines over sample flight data")]
struct Cli {
    #[arg(long, value_enum, default_value_t = Section::All, help = "Section to run")]
    section: Section,

    #[arg(long, default_value_t = 10, help = "Rows to print per table")]
    max_rows: usize,
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wrangle_examples=info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .init();
}

struct Tour {
    max_rows: usize,
}

impl Tour {
    fn show(&self, stage: &str, table: &Table) {
        info!(
            stage,
            rows = table.row_count(),
            columns = table.column_count(),
            "stage complete"
        );
        println!("== {stage}");
        println!("{}", render::render(table, self.max_rows));
    }

    fn select(&self, flights: &Table) -> Result<()> {
        let t = flights.select(["year", "month", "day"])?;
        self.show("select year, month, day", &t);
        let t = flights.select([!Selector::range("year", "day")])?;
        self.show("select -(year:day)", &t);
        let t = flights.select([Selector::ends_with("delay"), Selector::everything()])?;
        self.show("select ends_with(delay), everything()", &t);
        let t = flights.select([Selector::matches("^(dep|arr)_")?])?;
        self.show("select matches(^(dep|arr)_)", &t);
        let t = flights.rename([("tail_carrier", "carrier")])?;
        self.show("rename tail_carrier = carrier", &t);
        Ok(())
    }

    fn filter(&self, flights: &Table) -> Result<()> {
        let t = flights.filter([col("month").eq(lit(1)), col("day").eq(lit(1))])?;
        self.show("filter month == 1, day == 1", &t);
        let t = flights.filter([col("dest").is_in(["IAH", "ORD"])])?;
        self.show("filter dest %in% (IAH, ORD)", &t);
        let t = flights.filter([col("dep_delay").is_missing()])?;
        self.show("filter is.na(dep_delay)", &t);
        let t = flights.filter_rows(|row| Ok(row.get("arr_delay")?.as_f64().map(|d| d > 10.0)))?;
        self.show("filter_rows arr_delay > 10", &t);
        Ok(())
    }

    fn mutate(&self, flights: &Table) -> Result<()> {
        let narrow = flights.select([
            Selector::range("year", "day"),
            Selector::ends_with("delay"),
            "distance".into(),
            "air_time".into(),
        ])?;
        let t = narrow.mutate([
            ("gain", col("dep_delay") - col("arr_delay")),
            ("speed", col("distance") / col("air_time") * lit(60)),
            ("hours", col("air_time") / lit(60)),
            ("gain_per_hour", col("gain") / col("hours")),
        ])?;
        self.show("mutate gain, speed, hours, gain_per_hour", &t);
        let t = flights.transmute([
            ("dep_rank", col("dep_delay").min_rank()),
            ("quartile", col("dep_delay").ntile(4)),
            ("late", if_else(col("arr_delay").gt(lit(0)), lit("late"), lit("on time"))),
            (
                "band",
                case_when(
                    [
                        (col("distance").lt(lit(500)), lit("short")),
                        (col("distance").lt(lit(1500)), lit("medium")),
                    ],
                    lit("long"),
                ),
            ),
        ])?;
        self.show("transmute ranks and labels", &t);
        Ok(())
    }

    fn arrange(&self, flights: &Table) -> Result<()> {
        let t = flights.arrange(["year", "month", "day"])?;
        self.show("arrange year, month, day", &t);
        let t = flights.arrange([desc("dep_delay")])?;
        self.show("arrange desc(dep_delay)", &t);
        let t = flights.distinct(["origin", "dest"])?;
        self.show("distinct origin, dest", &t);
        Ok(())
    }

    fn summarize(&self, flights: &Table) -> Result<()> {
        let t = flights.summarize([("delay", col("dep_delay").mean().skip_missing())])?;
        self.show("summarize mean(dep_delay)", &t);
        let t = flights.group_by(["year", "month", "day"])?.summarize([
            ("flights", n()),
            ("delay", col("dep_delay").mean().skip_missing()),
        ])?;
        self.show("group_by date |> summarize", &t);
        let delays = flights
            .group_by(["dest"])?
            .summarize([
                ("count", n()),
                ("dist", col("distance").mean().skip_missing()),
                ("delay", col("arr_delay").mean().skip_missing()),
            ])?
            .filter([col("count").gt(lit(1))])?;
        self.show("delays by destination", &delays);
        let per_day = flights.count(["year", "month", "day"])?;
        self.show("count year, month, day", &per_day);
        let per_month = per_day
            .group_by(["year", "month"])?
            .summarize([("n", col("n").sum())])?;
        self.show("roll up to month", &per_month);
        let worst = flights
            .group_by(["month"])?
            .filter([col("arr_delay").eq(col("arr_delay").max().skip_missing())])?
            .ungroup();
        self.show("worst arrival per month", &worst);
        Ok(())
    }

    fn join(&self, flights: &Table, airlines: &Table) -> Result<()> {
        let narrow = flights.select(["year", "month", "day", "carrier", "dest"])?;
        let t = narrow.left_join(airlines, ["carrier"])?;
        self.show("left_join airlines", &t);
        let t = narrow.inner_join(airlines, ["carrier"])?;
        self.show("inner_join airlines", &t);
        let t = narrow.anti_join(airlines, ["carrier"])?;
        self.show("anti_join airlines (unknown carriers)", &t);
        let t = airlines.semi_join(&narrow, ["carrier"])?;
        self.show("semi_join: airlines that flew", &t);
        let options = JoinOptions::default().with_suffix("_flight", "_airline");
        let t = narrow.join(airlines, Vec::<&str>::new(), JoinKind::Full, &options)?;
        self.show("natural full_join", &t);
        Ok(())
    }

    fn pivot(&self) -> Result<()> {
        let wide = data::cases_wide()?;
        self.show("cases (wide)", &wide);
        let long = wide.pivot_longer(
            &PivotLongerSpec::new([!Selector::from("country")])
                .with_names_to("year")
                .with_values_to("cases"),
        )?;
        self.show("pivot_longer", &long);
        let back = long.pivot_wider(&PivotWiderSpec::new("year", "cases"))?;
        self.show("pivot_wider", &back);
        Ok(())
    }

    fn program(&self, flights: &Table, airlines: &Table) -> Result<()> {
        let (f, a) = (TableId(1), TableId(2));
        let (named, late, summary) = (TableId(3), TableId(4), TableId(5));
        let program = Program::new()
            .with(Transform::Join {
                left: f,
                right: a,
                output: named,
                kind: JoinKind::Left,
                by: vec!["carrier".into()],
                options: JoinOptions::default(),
            })
            .with(Transform::Filter {
                input: named,
                output: late,
                group_by: vec![],
                predicates: vec![col("arr_delay").gt(lit(0))],
            })
            .with(Transform::Summarize {
                input: late,
                output: summary,
                group_by: vec!["name".into()],
                aggregations: vec![
                    ("late_flights".into(), n()),
                    ("worst".into(), col("arr_delay").max()),
                ],
            });
        debug!(inputs = ?program.required_inputs(), "program built");

        let inputs = [(f, flights.clone()), (a, airlines.clone())]
            .into_iter()
            .collect();
        let out = program.execute(&inputs).context("running program")?;
        if let Some(t) = out.get(summary) {
            self.show("program: late flights by airline", t);
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let flights = data::flights()?;
    let airlines = data::airlines()?;
    let tour = Tour {
        max_rows: cli.max_rows,
    };
    let wants = |s: Section| cli.section == Section::All || cli.section == s;

    if wants(Section::Select) {
        tour.select(&flights).context("select section")?;
    }
    if wants(Section::Filter) {
        tour.filter(&flights).context("filter section")?;
    }
    if wants(Section::Mutate) {
        tour.mutate(&flights).context("mutate section")?;
    }
    if wants(Section::Arrange) {
        tour.arrange(&flights).context("arrange section")?;
    }
    if wants(Section::Summarize) {
        tour.summarize(&flights).context("summarize section")?;
    }
    if wants(Section::Join) {
        tour.join(&flights, &airlines).context("join section")?;
    }
    if wants(Section::Pivot) {
        tour.pivot().context("pivot section")?;
    }
    if wants(Section::Program) {
        tour.program(&flights, &airlines).context("program section")?;
    }
    Ok(())
}
