//! `siabsensi-tools` 运维命令
//!
//! `seed` 走 HTTP API，其余命令直接连接配置中的数据库。

pub mod args;
pub mod catalog;
pub mod debug_day;
pub mod inspect;
pub mod seed;
pub mod test_data;

pub use args::{Cli, Commands};

use crate::errors::Result;
use crate::storage::sea_orm_storage::SeaOrmStorage;

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Seed(args) => seed::run(args).await,
        Commands::CheckData(args) => {
            let storage = SeaOrmStorage::new_async().await?;
            let tables = inspect::table_data(storage.connection(), args.limit).await?;
            inspect::print_table_data(&tables);
            Ok(())
        }
        Commands::CheckTables => {
            inspect::print_table_columns(&inspect::table_columns());
            Ok(())
        }
        Commands::InsertTestAttendance(args) => {
            let storage = SeaOrmStorage::new_async().await?;
            test_data::run(&storage, args.session_id).await
        }
        Commands::DebugDay(args) => {
            let storage = SeaOrmStorage::new_async().await?;
            debug_day::run(&storage, args.date.as_deref()).await
        }
    }
}
