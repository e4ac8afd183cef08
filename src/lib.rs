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

pub mod board;
pub mod catalog;
pub mod checker;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod driver;
pub mod error;
pub mod events;
#[cfg(test)]
mod helper;
pub mod phase;
pub mod reservoir;
pub mod scoring;
pub mod selector;
pub mod session;
pub mod types;
