use femesh::orientation::Orientation;
use proptest::prelude::*;

#[test]
fn edge_orientation() {
    assert_eq!(Orientation::edge([3, 7], [3, 7]), Some(Orientation::Edge { reversed: false }));
    assert_eq!(Orientation::edge([3, 7], [7, 3]), Some(Orientation::Edge { reversed: true }));
    assert_eq!(Orientation::edge([3, 7], [3, 8]), None);

    let reversed = Orientation::Edge { reversed: true };
    assert!(reversed.flips_sign());
    assert_eq!(reversed.map_vertex(0, 2), 1);
    assert_eq!(reversed.map_vertex(1, 2), 0);
}

#[test]
fn face_orientation_of_rotated_and_reflected_rings() {
    let reference = [10, 11, 12, 13];

    assert_eq!(
        Orientation::face(&reference, &[10, 11, 12, 13]),
        Some(Orientation::Face {
            rotation: 0,
            reflected: false
        })
    );
    assert_eq!(
        Orientation::face(&reference, &[13, 10, 11, 12]),
        Some(Orientation::Face {
            rotation: 1,
            reflected: false
        })
    );
    assert_eq!(
        Orientation::face(&reference, &[10, 13, 12, 11]),
        Some(Orientation::Face {
            rotation: 0,
            reflected: true
        })
    );
    assert_eq!(
        Orientation::face(&[4, 5, 6], &[5, 4, 6]),
        Some(Orientation::Face {
            rotation: 1,
            reflected: true
        })
    );

    // Not a cyclic permutation
    assert_eq!(Orientation::face(&reference, &[10, 12, 11, 13]), None);
    // Different vertices
    assert_eq!(Orientation::face(&reference, &[10, 11, 12, 14]), None);
    // Different arity
    assert_eq!(Orientation::face(&reference, &[10, 11, 12]), None);
}

#[test]
fn aligned_orientation_is_identity() {
    assert_eq!(Orientation::default(), Orientation::Aligned);
    for n in 2..5 {
        for k in 0..n {
            assert_eq!(Orientation::Aligned.map_vertex(k, n), k);
        }
    }
    assert!(!Orientation::Aligned.flips_sign());
}

proptest! {
    #[test]
    fn face_orientation_maps_reference_onto_local_ring(
        n in 3usize..=4,
        rotation in 0usize..4,
        reflected in any::<bool>(),
    ) {
        let rotation = rotation % n;
        let reference: Vec<usize> = (0..n).map(|k| 100 + k).collect();
        let expected = Orientation::Face { rotation, reflected };

        let mut local = vec![0; n];
        for k in 0..n {
            local[expected.map_vertex(k, n)] = reference[k];
        }

        prop_assert_eq!(Orientation::face(&reference, &local), Some(expected));
        prop_assert_eq!(expected.flips_sign(), reflected);
    }
}
