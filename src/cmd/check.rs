// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;

use walkdir::WalkDir;

use crate::catalog::Catalog;
use crate::error::Fallible;
use crate::error::fail;

/// Validate a catalog file, or every `.json` file under a directory.
pub fn check_catalogs(path: &Path) -> Fallible<()> {
    if !path.exists() {
        return fail(format!("{} does not exist.", path.display()));
    }
    if path.is_file() {
        Catalog::load(path)?;
    } else {
        let mut count = 0;
        for entry in WalkDir::new(path) {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                log::debug!("Checking {}.", path.display());
                Catalog::load(path)?;
                count += 1;
            }
        }
        if count == 0 {
            return fail(format!("no catalogs found in {}.", path.display()));
        }
        log::debug!("Checked {count} catalogs.");
    }
    println!("ok");
    Ok(())
}
