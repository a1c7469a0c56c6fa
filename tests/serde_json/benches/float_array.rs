#[cfg(not(debug_assertions))]
use rand_core::{RngCore, OsRng};

#[cfg(debug_assertions)]
fn main() {}
#[cfg(not(debug_assertions))]
fn main() {
  // Generate a 64 MB array
  let mut array = vec![0f64; 64 * 1024 * 1024 / 8];
  for e in &mut array {
    *e = loop {
      if let Some(float) = serde_json::Number::from_f64(f64::from_bits(OsRng.next_u64())) {
        break float.as_f64().unwrap();
      }
    };
  }

  {
    let start = std::time::Instant::now();
    let mut serialization = vec![];
    serde_json::to_writer(&mut serialization, &array).unwrap();
    let _ = core::hint::black_box(serialization);
    println!("serde_json took {}ms to serialize a 64 MB f64 array", start.elapsed().as_millis());
  }

  {
    let value =
      shape_json::Value::Array(array.iter().copied().map(shape_json::Value::from).collect());
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(shape_json::serialize(&value).unwrap());
    println!("shape-json took {}ms to serialize a 64 MB f64 array", start.elapsed().as_millis());
  }

  let serialization = serde_json::to_string(&array).unwrap();

  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(
      serde_json::from_str::<serde_json::Value>(&serialization).unwrap(),
    );
    println!("serde_json took {}ms to deserialize a 64 MB f64 array", start.elapsed().as_millis());
  }

  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(shape_json::parse(&serialization).unwrap());
    println!("shape-json took {}ms to deserialize a 64 MB f64 array", start.elapsed().as_millis());
  }

  {
    let start = std::time::Instant::now();
    let value = shape_json::parse(&serialization).unwrap();
    for value in value.as_array().unwrap() {
      let _ = core::hint::black_box(value.as_number().unwrap().as_f64());
    }
    println!(
      "shape-json took {}ms to deserialize and dynamically-typed read a 64 MB f64 array",
      start.elapsed().as_millis()
    );
  }
}
