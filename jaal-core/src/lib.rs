pub mod data;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod model;
pub mod query;
pub mod report;
pub mod style;

pub use data::{Dataset, Table, load_dataset, load_dataset_from_paths};
pub use dispatch::{ControlEvent, ControlId, Controls, Dashboard, DispatchOutcome};
pub use error::{JaalError, Result};
pub use model::{AttrValue, Edge, GraphData, Node};

pub fn print_banner() {
    let banner = r#"
       _             _
      (_) __ _  __ _| |
      | |/ _` |/ _` | |
      | | (_| | (_| | |
     _/ |\__,_|\__,_|_|
    |__/   graph explorer
"#;
    println!("{}", banner);
}
