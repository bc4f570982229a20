mod fixture_loader;

pub use fixture_loader::TransformTest;
