use proptest::prelude::*;

use bnry::classify::{classify, Classification, RESERVED_FIELDS};
use bnry::document::IplFile;
use bnry::header::{Header, HEADER_SIZE};
use bnry::records::{InstanceRecord, VehicleSpawnRecord, INSTANCE_RECORD_SIZE};
use bnry::text::{car_to_line, instance_to_line, parse_car_line, parse_instance_line};

/// Floats that survive the 6-fractional-digit text rendering exactly:
/// dyadic values n/64 are both exact in f32 and exact in six decimals.
fn quantized() -> impl Strategy<Value = f32> {
    (-(1i32 << 20)..(1i32 << 20)).prop_map(|n| n as f32 / 64.0)
}

fn instance_strategy() -> impl Strategy<Value = InstanceRecord> {
    (
        any::<i32>(),
        proptest::array::uniform3(quantized()),
        proptest::array::uniform4(quantized()),
        any::<u32>(),
    )
        .prop_map(|(obj_id, pos, rot, flags)| InstanceRecord {
            pos,
            rot,
            obj_id,
            interior: 0,
            flags,
        })
}

fn car_strategy() -> impl Strategy<Value = VehicleSpawnRecord> {
    (
        any::<i32>(),
        proptest::array::uniform3(quantized()),
        quantized(),
        proptest::array::uniform7(any::<i32>()),
    )
        .prop_map(|(vehicle_id, pos, angle, aux)| VehicleSpawnRecord {
            pos,
            angle,
            vehicle_id,
            aux,
        })
}

proptest! {
    #[test]
    fn classifier_is_total_over_reserved_fields(fields in proptest::array::uniform18(0u32..3)) {
        let header = Header { fields };
        let expect_extended = RESERVED_FIELDS.iter().any(|&index| fields[index] != 0);
        let classification = classify(&header);
        prop_assert_eq!(
            classification == Classification::Extended,
            expect_extended
        );
    }

    #[test]
    fn instance_text_round_trips(record in instance_strategy()) {
        let line = instance_to_line(&record);
        prop_assert_eq!(parse_instance_line(&line, 1).unwrap(), record);
    }

    #[test]
    fn car_text_round_trips(record in car_strategy()) {
        let line = car_to_line(&record);
        prop_assert_eq!(parse_car_line(&line, 1).unwrap(), record);
    }

    #[test]
    fn encode_layout_is_canonical(
        instances in proptest::collection::vec(instance_strategy(), 0..4),
        cars in proptest::collection::vec(car_strategy(), 0..4),
    ) {
        let bytes = IplFile::from_records(instances.clone(), cars.clone())
            .encode_compact()
            .unwrap();
        let decoded = IplFile::decode(&bytes).unwrap();

        prop_assert_eq!(&decoded.instances, &instances);
        prop_assert_eq!(&decoded.cars, &cars);

        // Zero offsets for zero counts; arrays packed directly after the
        // header otherwise.
        let expected_inst_offset = if instances.is_empty() { 0 } else { HEADER_SIZE as u32 };
        let expected_car_offset = if cars.is_empty() {
            0
        } else {
            (HEADER_SIZE + instances.len() * INSTANCE_RECORD_SIZE) as u32
        };
        prop_assert_eq!(decoded.header.instance_offset(), expected_inst_offset);
        prop_assert_eq!(decoded.header.car_offset(), expected_car_offset);

        // A second cycle changes nothing.
        prop_assert_eq!(decoded.encode_compact().unwrap(), bytes);
    }

    #[test]
    fn decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = IplFile::decode(&bytes);
    }
}
