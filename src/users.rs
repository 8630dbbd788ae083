// Copyright (C) 2025 Kevin Exton
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::scylla_connector::ScyllaManager;
use crate::tracer::TraceContext;
use anyhow::{Context, Result};
use scylla::DeserializeRow;
use std::sync::Arc;
use tracing::info;

pub const SELECT_FIRSTNAME_AGE: &str = "SELECT firstname, age FROM users WHERE lastname='Jones'";
pub const SELECT_USER: &str =
    "SELECT firstname, lastname, age, email, city FROM users WHERE lastname='Jones'";

#[derive(Clone, Debug, DeserializeRow, PartialEq)]
pub struct User {
    pub firstname: String,
    pub lastname: String,
    pub age: i32,
    pub email: String,
    pub city: String,
}

impl User {
    /// The row the demo writes and reads back.
    pub fn sample() -> Self {
        User {
            firstname: "Bob".to_string(),
            lastname: "Jones".to_string(),
            age: 35,
            email: "bob@example.com".to_string(),
            city: "Austin".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct UserDirectory {
    scylla_manager: Arc<ScyllaManager>,
    trace: TraceContext,
}

impl UserDirectory {
    pub async fn new(scylla_manager: Arc<ScyllaManager>, trace: TraceContext) -> Result<Self> {
        let directory = UserDirectory { scylla_manager, trace };
        directory.initialize_schema().await?;
        Ok(directory)
    }

    async fn initialize_schema(&self) -> Result<()> {
        let session = &self.scylla_manager.session;
        let statement = self.trace.statement(
            "CREATE TABLE IF NOT EXISTS users (
                firstname text,
                lastname text,
                age int,
                email text,
                city text,
                PRIMARY KEY (lastname)
            )",
        );
        let result = session
            .query_unpaged(statement, &[])
            .await
            .context("Failed to create users table")?;
        self.trace.report(session, "create table", &result).await;
        info!("users table ready");
        Ok(())
    }

    pub async fn insert_sample(&self) -> Result<User> {
        let user = User::sample();
        let session = &self.scylla_manager.session;
        let statement = self.trace.statement(
            "INSERT INTO users (lastname, age, city, email, firstname) VALUES ('Jones', 35, 'Austin', 'bob@example.com', 'Bob')",
        );
        let result = session
            .query_unpaged(statement, &[])
            .await
            .context("Failed to insert sample user")?;
        self.trace.report(session, "insert user", &result).await;
        info!(lastname = %user.lastname, "inserted user");
        Ok(user)
    }

    /// First name and age of the sample user.
    pub async fn sample_first_name_and_age(&self) -> Result<(String, i32)> {
        let session = &self.scylla_manager.session;
        let result = session
            .query_unpaged(self.trace.statement(SELECT_FIRSTNAME_AGE), &[])
            .await
            .context("Failed to query first name and age of the sample user")?;
        self.trace.report(session, "select firstname, age", &result).await;
        let row = result.into_rows_result()?.first_row::<(String, i32)>()?;
        Ok(row)
    }

    /// The full sample user row, if it has been written.
    pub async fn find_sample(&self) -> Result<Option<User>> {
        let session = &self.scylla_manager.session;
        let result = session
            .query_unpaged(self.trace.statement(SELECT_USER), &[])
            .await
            .context("Failed to query the sample user")?;
        self.trace.report(session, "select user", &result).await;
        let user = result.into_rows_result()?.maybe_first_row::<User>()?;
        Ok(user)
    }
}
