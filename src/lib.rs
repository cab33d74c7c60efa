/*!
# Service Dashboard

An interactive dashboard for rating services along four dimensions, shown as
a 3-D scatter plot, built in Rust.

## Overview

Each service has a name and four integer ratings from 1 to 10: urgency,
resources, regulations and uncertainty. The dashboard plots urgency,
resources and regulations as the three axes, colours each point by its
uncertainty and labels it with the service name. Form controls add new
services, update the ratings of an existing one, or remove it.

## Architecture

### Update Cycle
Every user action runs one cycle:

1. the pressed control is mapped to a [`Trigger`](cycle::Trigger) by
   [`dispatch`](cycle::dispatch)
2. the current [`Dataset`](record::Dataset) is loaded from the store
   (seeded with five services on first access)
3. [`apply`](cycle::apply) computes the next dataset
4. the whole dataset is saved back to the store
5. [`project`](view::project) derives the chart points and selector options

### Stores
- **memory**: one dataset in process memory, shared by every client
- **session**: one dataset per session cookie
- **sqlite**: a `services` table, fully rewritten on every cycle
- **file**: a gzip-compressed bincode snapshot

### Web Layer
- **Technologies**: axum, plotters (SVG), rust_xlsxwriter
- **Endpoints**:
  - `/` - dashboard page
  - `/api/dataset` - current records, chart points and selector options
  - `/api/cycle` - run one add/update/remove cycle
  - `/api/chart.svg` - the 3-D scatter plot
  - `/api/export.csv`, `/api/export.xlsx` - downloads

## Modules

- **record**: service records, the dataset and its seed set
- **cycle**: triggers, form snapshots and the update cycle
- **view**: chart and selector projection
- **store**: the store trait and the in-memory store
- **saving**: snapshot file store
- **sqlite**: SQLite table store
- **session**: per-session stores (web)
- **downloader**: CSV and XLSX export
- **graph**: SVG chart rendering (web)
- **app**: routing and handlers (web)
- **config**: environment configuration
- **error**: error types
*/

pub mod config;
pub mod cycle;
pub mod downloader;
pub mod error;
pub mod record;
pub mod saving;
pub mod sqlite;
pub mod store;
pub mod view;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod graph;
#[cfg(feature = "web")]
pub mod session;

pub use cycle::{CycleOutcome, FormSnapshot, Trigger, apply, dispatch, run_cycle};
pub use error::{DashboardError, StoreError};
pub use record::{Dataset, ServiceRecord};
pub use store::{DatasetStore, MemoryStore};
pub use view::{ChartPoint, View, project};
