use anyhow::Result;

use bloomstore::codec::{decode_cascade, decode_filter, encode_cascade, encode_filter};
use bloomstore::{BloomFilter, Error, FilterCascade};

#[test]
fn empty_filter_roundtrip() -> Result<()> {
    let f = BloomFilter::new(80, 3)?;
    let back = decode_filter(&encode_filter(&f))?;
    assert_eq!(back, f);
    assert_eq!(back.inserted(), 0);
    Ok(())
}

#[test]
fn populated_filter_roundtrip() -> Result<()> {
    let mut f = BloomFilter::new(800, 5)?;
    for i in 0..100 {
        f.add(format!("key-{}", i).as_bytes());
    }
    let back = decode_filter(&encode_filter(&f))?;
    assert_eq!(back.capacity_bits(), 800);
    assert_eq!(back.hash_count(), 5);
    assert_eq!(back.inserted(), 100);
    assert_eq!(back.bit_bytes(), f.bit_bytes());
    for i in 0..100 {
        assert!(back.contains(format!("key-{}", i).as_bytes()));
    }
    Ok(())
}

#[test]
fn saturated_filter_roundtrip() -> Result<()> {
    // Tiny filter driven to full saturation: every query answers true,
    // and the codec must still reproduce it exactly.
    let mut f = BloomFilter::new(8, 4)?;
    for i in 0..64 {
        f.add(format!("{}", i).as_bytes());
    }
    let back = decode_filter(&encode_filter(&f))?;
    assert_eq!(back, f);
    Ok(())
}

#[test]
fn cascade_roundtrip_preserves_generations() -> Result<()> {
    let mut c = FilterCascade::new(10, 0.01, 2.0)?;
    let keys: Vec<String> = (0..100).map(|i| format!("user-{}", i)).collect();
    for k in &keys {
        c.add(k.as_bytes())?;
    }
    assert!(c.generations().len() >= 2, "cascade should have grown");

    let bytes = encode_cascade(c.generations());
    let gens = decode_cascade(&bytes)?;
    assert_eq!(gens.len(), c.generations().len());
    for (orig, back) in c.generations().iter().zip(gens.iter()) {
        assert_eq!(back, orig);
    }

    // reconstructed cascade keeps the no-false-negative guarantee
    let back = FilterCascade::from_generations(gens, 0.01, 2.0)?;
    for k in &keys {
        assert!(back.contains(k.as_bytes()), "false negative for {}", k);
    }
    Ok(())
}

#[test]
fn truncated_cascade_tail_is_corrupt() -> Result<()> {
    let mut c = FilterCascade::new(10, 0.01, 2.0)?;
    for i in 0..50 {
        c.add(format!("k{}", i).as_bytes())?;
    }
    let bytes = encode_cascade(c.generations());

    // chop mid-way through the last block's buffer
    let cut = &bytes[..bytes.len() - 3];
    assert!(matches!(decode_cascade(cut), Err(Error::Corrupt(_))));

    // chop mid-way through a header
    let cut = &bytes[..5];
    assert!(matches!(decode_cascade(cut), Err(Error::Corrupt(_))));
    Ok(())
}
