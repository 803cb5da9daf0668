#[cfg(test)]
mod common;

#[cfg(test)]
mod closure_test;
