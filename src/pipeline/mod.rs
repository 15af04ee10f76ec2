pub mod background;
pub mod grid;
pub mod layer;

#[cfg(test)]
pub(crate) mod test_fixture;
