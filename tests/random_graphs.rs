use blkcol_dijkstra::generate::RandomGraph;
use blkcol_dijkstra::reference::{dijkstra, verify};
use blkcol_dijkstra::{solve, UNREACHABLE};

fn divisors(n: usize) -> impl Iterator<Item = usize> {
    (1..=n).filter(move |w| n % w == 0)
}

#[test]
fn matches_serial_dijkstra_for_every_divisor() {
    let cases = [(12, 0.3, 1), (12, 0.05, 2), (16, 0.6, 3), (9, 0.2, 4)];
    for (vertices, edge_probability, seed) in cases {
        let matrix = RandomGraph {
            vertices,
            edge_probability,
            max_weight: 20,
            seed,
        }
        .build();
        let expected = dijkstra(&matrix);
        let first = solve(&matrix, 1).unwrap();
        for workers in divisors(vertices) {
            let paths = solve(&matrix, workers).unwrap();
            assert_eq!(paths.dist(), expected.as_slice(), "n={vertices} workers={workers}");
            verify(&matrix, &paths).unwrap();
            assert_eq!(paths, first, "n={vertices} workers={workers}");
        }
    }
}

#[test]
fn paths_walk_back_to_the_source() {
    let matrix = RandomGraph {
        vertices: 24,
        edge_probability: 0.15,
        max_weight: 50,
        seed: 11,
    }
    .build();
    let paths = solve(&matrix, 6).unwrap();
    assert_eq!(paths.dist()[0], 0);
    assert_eq!(paths.pred()[0], None);
    for v in 0..matrix.vertices() {
        match paths.path_to(v) {
            Some(path) => {
                assert_eq!(path.first(), Some(&0));
                assert_eq!(path.last(), Some(&v));
                assert!(path.len() <= matrix.vertices());
                let length: u64 = path.windows(2).map(|hop| matrix.get(hop[0], hop[1])).sum();
                assert_eq!(length, paths.dist()[v]);
            }
            None => assert_eq!(paths.dist()[v], UNREACHABLE),
        }
    }
}

#[test]
fn json_output() {
    let matrix = RandomGraph {
        vertices: 4,
        edge_probability: 0.0,
        max_weight: 1,
        seed: 0,
    }
    .build();
    let paths = solve(&matrix, 2).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("paths.json");
    paths.write_json(&file).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(json["dist"], serde_json::json!([0, null, null, null]));
    assert_eq!(json["pred"], serde_json::json!([null, null, null, null]));
    assert_eq!(json["paths"][0], serde_json::json!([0]));
    assert_eq!(json["paths"][3], serde_json::Value::Null);
}
