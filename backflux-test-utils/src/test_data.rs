// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::user::User;

#[must_use]
pub fn skyler() -> User {
    User::new("swhite", "Skyler", "White")
}

#[must_use]
pub fn jesse() -> User {
    User::new("jpinkman", "Jesse", "Pinkman")
}

#[must_use]
pub fn walter() -> User {
    User::new("wwhite", "Walter", "White")
}

#[must_use]
pub fn saul() -> User {
    User::new("sgoodman", "Saul", "Goodman")
}

#[must_use]
pub fn marie() -> User {
    User::new("mschrader", "Marie", "Schrader")
}

#[must_use]
pub fn mike() -> User {
    User::new("mehrmantraut", "Mike", "Ehrmantraut")
}

/// Skyler, Jesse, Walter and Saul, in that order.
#[must_use]
pub fn default_users() -> Vec<User> {
    vec![skyler(), jesse(), walter(), saul()]
}
