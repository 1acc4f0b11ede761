//! `route` subcommand.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use roadnet_lib::{Coordinate, RouteEngine, RouteOutput, RouteRequest, RouteStrategy, WeightMetric};

use crate::commands::CommandContext;
use crate::output::{render_route_text, to_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Repeat the single shortest route.
    Repeat,
    /// Distinct loop-free routes in increasing cost order.
    KShortest,
}

impl From<StrategyArg> for RouteStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Repeat => RouteStrategy::Repeat,
            StrategyArg::KShortest => RouteStrategy::KShortest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    Length,
    TravelTime,
    Hops,
}

impl From<MetricArg> for WeightMetric {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::Length => WeightMetric::Length,
            MetricArg::TravelTime => WeightMetric::TravelTime,
            MetricArg::Hops => WeightMetric::Hops,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct RouteArgs {
    /// Origin as `lat,lon`.
    #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
    pub from: Coordinate,

    /// Destination as `lat,lon`.
    #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
    pub to: Coordinate,

    /// Number of routes to return (1-10).
    #[arg(long, default_value_t = 1)]
    pub num_routes: i64,

    #[arg(long, value_enum, default_value_t = StrategyArg::Repeat)]
    pub strategy: StrategyArg,

    #[arg(long, value_enum, default_value_t = MetricArg::Length)]
    pub metric: MetricArg,
}

impl RouteArgs {
    pub fn to_request(&self) -> RouteRequest {
        RouteRequest::new(self.from, self.to)
            .with_num_routes(self.num_routes)
            .with_strategy(self.strategy.into())
            .with_metric(self.metric.into())
    }
}

/// Parse `lat,lon` into a validated coordinate.
pub fn parse_coordinate(value: &str) -> std::result::Result<Coordinate, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `lat,lon`, got `{value}`"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude `{}`: {e}", lat.trim()))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude `{}`: {e}", lon.trim()))?;
    Coordinate::checked(lat, lon).map_err(|e| e.to_string())
}

pub fn handle_route(ctx: &CommandContext, args: &RouteArgs) -> Result<String> {
    let (graph, _) = ctx.graph.load()?;
    let engine = RouteEngine::new(Arc::new(graph));

    let plan = engine.plan(&args.to_request()).with_context(|| {
        format!(
            "failed to calculate route from ({}, {}) to ({}, {})",
            args.from.lat, args.from.lon, args.to.lat, args.to.lon
        )
    })?;
    let output = RouteOutput::from_plan(engine.graph(), &plan);

    if ctx.format.is_json() {
        to_json(&output)
    } else {
        Ok(render_route_text(&output, &ctx.palette))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinates() {
        let coordinate = parse_coordinate("12.9, 77.5").unwrap();
        assert_eq!(coordinate, Coordinate::new(12.9, 77.5));

        let southern = parse_coordinate("-33.86,151.21").unwrap();
        assert_eq!(southern.lat, -33.86);
    }

    #[test]
    fn rejects_malformed_coordinates() {
        assert!(parse_coordinate("12.9").is_err());
        assert!(parse_coordinate("north,77.5").is_err());
        assert!(parse_coordinate("95.0,77.5").is_err());
    }

    #[test]
    fn args_map_to_request() {
        let args = RouteArgs {
            from: Coordinate::new(12.9, 77.5),
            to: Coordinate::new(12.93, 77.53),
            num_routes: 3,
            strategy: StrategyArg::KShortest,
            metric: MetricArg::TravelTime,
        };
        let request = args.to_request();
        assert_eq!(request.num_routes, 3);
        assert_eq!(request.strategy, RouteStrategy::KShortest);
        assert_eq!(request.metric, WeightMetric::TravelTime);
    }
}
