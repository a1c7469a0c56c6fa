#[cfg(debug_assertions)]
fn main() {}
#[cfg(not(debug_assertions))]
fn main() {
  // Generate a 256 MB string inside an array
  let string = String::from_utf8(vec![b'A'; 256 * 1024 * 1024]).unwrap();

  {
    let start = std::time::Instant::now();
    let mut serialization = vec![];
    serde_json::to_writer(&mut serialization, &[&string]).unwrap();
    let _ = core::hint::black_box(serialization);
    println!(
      "serde_json took {}ms to serialize a 256 MB ASCII string",
      start.elapsed().as_millis()
    );
  }

  let value = shape_json::Value::Array(vec![shape_json::Value::String(string)]);
  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(shape_json::serialize(&value).unwrap());
    println!(
      "shape-json took {}ms to serialize a 256 MB ASCII string",
      start.elapsed().as_millis()
    );
  }

  let serialization = shape_json::serialize(&value).unwrap();
  drop(value);

  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(
      serde_json::from_str::<serde_json::Value>(&serialization).unwrap(),
    );
    println!(
      "serde_json took {}ms to deserialize a 256 MB ASCII string",
      start.elapsed().as_millis()
    );
  }

  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(shape_json::parse(&serialization).unwrap());
    println!(
      "shape-json took {}ms to deserialize a 256 MB ASCII string",
      start.elapsed().as_millis()
    );
  }
}
