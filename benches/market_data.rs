use criterion::{criterion_group, criterion_main, Criterion};
use tapejson::{Config, Parser, Writer};

// A synthetic trade-tick feed shaped like an exchange market-data channel:
// a top-level array of flat objects, the case `Document::stream_array` and
// `ArrayCursor` exist for.
fn make_trades(n: usize) -> String {
    let mut w = Writer::with_capacity(n * 96);
    w.array_start().unwrap();
    for i in 0..n {
        w.object_start().unwrap();
        w.field_string("symbol", "BTCUSDT").unwrap();
        w.field_double("price", 27000.5 + (i % 37) as f64).unwrap();
        w.field_double("qty", 0.01 * (i % 11 + 1) as f64).unwrap();
        w.field_long("trade_id", 1_000_000 + i as i64).unwrap();
        w.field_long("timestamp", 1_700_000_000_000 + i as i64).unwrap();
        w.field_boolean("is_buyer_maker", i % 2 == 0).unwrap();
        w.object_end().unwrap();
    }
    w.array_end().unwrap();
    w.into_string()
}

pub fn stream_sum_price(c: &mut Criterion) {
    let trades = make_trades(256);

    c.bench_function("stream_sum_price", |b| {
        let mut parser = Parser::new(Config::default());
        b.iter(|| {
            let doc = parser.parse_str(&trades).unwrap();
            let mut cursor = doc.stream_array().unwrap();
            let mut total = 0.0;
            while let Some(value) = cursor.next() {
                let obj = value.as_object().unwrap();
                let price = obj.get("price").unwrap().unwrap().as_number().unwrap();
                total += price.as_double().unwrap();
            }
            assert!(total > 0.0);
        })
    });
}

pub fn random_access_fields(c: &mut Criterion) {
    let trades = make_trades(256);

    // Field lookup by name on every element, exercising the object index
    // cache (built once per object, on first `get`) rather than the
    // sibling-chain walk the streaming benchmark above takes.
    c.bench_function("random_access_fields", |b| {
        let mut parser = Parser::new(Config::default());
        b.iter(|| {
            let doc = parser.parse_str(&trades).unwrap();
            let array = doc.value().as_array().unwrap();
            let mut seen_buys = 0usize;
            for i in 0..array.size() {
                let obj = array.get(i).unwrap().as_object().unwrap();
                let maker = obj
                    .get("is_buyer_maker")
                    .unwrap()
                    .unwrap()
                    .as_boolean()
                    .unwrap();
                if maker {
                    seen_buys += 1;
                }
                let symbol = obj.get("symbol").unwrap().unwrap().as_string().unwrap();
                assert!(symbol.equals("BTCUSDT").unwrap());
            }
            assert!(seen_buys > 0);
        })
    });
}

pub fn write_trades(c: &mut Criterion) {
    c.bench_function("write_trades", |b| {
        let mut w = Writer::with_capacity(256 * 96);
        b.iter(|| {
            w.reset();
            let buf = std::hint::black_box(&mut w);
            buf.array_start().unwrap();
            for i in 0..256usize {
                buf.object_start().unwrap();
                buf.field_string("symbol", "BTCUSDT").unwrap();
                buf.field_double("price", 27000.5 + (i % 37) as f64).unwrap();
                buf.field_double("qty", 0.01 * (i % 11 + 1) as f64).unwrap();
                buf.field_long("trade_id", 1_000_000 + i as i64).unwrap();
                buf.field_boolean("is_buyer_maker", i % 2 == 0).unwrap();
                buf.object_end().unwrap();
            }
            buf.array_end().unwrap();
            assert!(buf.size() > 0);
        })
    });
}

criterion_group!(benches, stream_sum_price, random_access_fields, write_trades);
criterion_main!(benches);
