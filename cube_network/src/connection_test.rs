#[cfg(test)]
mod test {
    use crate::transport::{pipe, PipeEnd};
    use crate::*;
    use anyhow::Result;
    use cube_types::serde::{FieldReader, FieldWriter};
    use cube_types::values::*;
    use cube_types::ValueError;
    use rand::seq::SliceRandom;
    use std::io::{Read, Write};

    fn connected() -> Result<(Connection<PipeEnd>, Connection<PipeEnd>)> {
        let (a, b) = pipe();
        Ok((Connection::new(a)?, Connection::new(b)?))
    }

    fn samples() -> Result<Vec<Value>> {
        let mut sfv = ScaleFuncValue::new();
        sfv.add_term(Term::new(2., 1, 2, 1), true)?;
        sfv.add_term(Term::new(-0.5, 0, 1, 0), true)?;
        sfv.add_measurement(Measurement {
            num_processes: 8,
            mean: 1.5,
            width: 0.25,
        })?;

        Ok(vec![
            Value::from(-1.25f64),
            MinDoubleValue(3.5).into(),
            MaxDoubleValue(-f64::MAX).into(),
            Value::from(i8::MIN),
            Value::from(u8::MAX),
            Value::from(-300i16),
            Value::from(60_000u16),
            Value::from(i32::MIN),
            Value::from(u32::MAX),
            Value::from(-(1i64 << 40)),
            Value::from(u64::MAX),
            ComplexValue::new(1., -2.).into(),
            RateValue::new(3., 4.).into(),
            StatLevel1Value::from_sample(2.).into(),
            StatLevel2Value::new(3, [6., 14.]).into(),
            StatLevel3Value::new(2, [1., 5., 9.]).into(),
            StatLevel4Value::default().into(),
            TauAtomicValue::new(4, 0.5, 2., 5., 7.5).into(),
            HistogramValue::with_bins(0., 10., vec![1., 0., 3.]).into(),
            NDoublesValue::with_values(vec![1., 2., 3., 4., 5.]).into(),
            sfv.into(),
            Value::from("stream"),
            Value::from(""),
        ])
    }

    fn round_trip(swap: bool) -> Result<()> {
        let (client, server) = connected()?;
        client.set_byte_swap(swap);
        server.set_byte_swap(swap);

        let mut samples = samples()?;
        samples.shuffle(&mut rand::thread_rng());
        {
            let mut tx = client.sender()?;
            for sample in samples.iter() {
                tx.send_value(sample)?;
            }
            tx.flush()?;
        }

        let mut rx = server.receiver()?;
        for sample in samples.iter() {
            let mut received = new_value(sample.data_type())?;
            rx.receive_value(&mut received)?;
            assert_eq!(sample, &received);
        }
        Ok(())
    }

    #[test]
    fn values_round_trip() -> Result<()> {
        round_trip(false)
    }

    #[test]
    fn values_round_trip_with_byte_swap() -> Result<()> {
        round_trip(true)
    }

    #[test]
    fn byte_swap_reverses_each_field_on_the_wire() -> Result<()> {
        let (a, b) = pipe();
        let conn = Connection::new(a)?;
        let PipeEnd { mut reader, .. } = b;

        conn.set_byte_swap(true);
        {
            let mut tx = conn.sender()?;
            tx.put(0x0a0b_0c0du32)?;
            tx.put(1.5f64)?;
            tx.flush()?;
        }

        let mut wire = [0u8; 12];
        reader.read_exact(&mut wire)?;
        assert_eq!(0x0a0b_0c0du32.swap_bytes().to_ne_bytes(), wire[..4]);
        assert_eq!(1.5f64.to_bits().swap_bytes().to_ne_bytes(), wire[4..]);
        Ok(())
    }

    #[test]
    fn strings_are_length_prefixed_with_terminator() -> Result<()> {
        let (a, b) = pipe();
        let conn = Connection::new(a)?;
        let PipeEnd {
            mut reader,
            mut writer,
        } = b;

        {
            let mut tx = conn.sender()?;
            tx.put_str("abc")?;
            tx.flush()?;
        }
        let mut wire = [0u8; 12];
        reader.read_exact(&mut wire)?;
        assert_eq!(4u64.to_ne_bytes(), wire[..8]);
        assert_eq!(b"abc\0", &wire[8..]);

        writer.write_all(&wire)?;
        assert_eq!("abc", conn.receiver()?.get_str()?);
        Ok(())
    }

    #[test]
    fn handshake_detects_byte_order() -> Result<()> {
        let (client, server) = connected()?;
        client.handshake_client()?;
        server.handshake_server()?;
        assert!(!server.byte_swap());

        let (a, b) = pipe();
        let server = Connection::new(a)?;
        let PipeEnd { mut writer, .. } = b;
        writer.write_all(&ENDIANNESS_MARKER.swap_bytes().to_ne_bytes())?;
        writer.write_all(&7u32.swap_bytes().to_ne_bytes())?;
        server.handshake_server()?;
        assert!(server.byte_swap());
        assert_eq!(7u32, server.receiver()?.get::<u32>()?);

        let (a, b) = pipe();
        let server = Connection::new(a)?;
        let PipeEnd { mut writer, .. } = b;
        writer.write_all(&0xdead_beefu32.to_ne_bytes())?;
        let err = server.handshake_server().unwrap_err();
        assert!(matches!(err, NetworkError::Unrecoverable(_)), "{err:?}");
        Ok(())
    }

    #[test]
    fn smaller_incoming_array_is_consumed() -> Result<()> {
        let (client, server) = connected()?;
        {
            let mut tx = client.sender()?;
            tx.send_value(&NDoublesValue::with_values(vec![1., 2.]).into())?;
            tx.put(42u32)?;
            tx.send_value(&NDoublesValue::with_values(vec![3., 4.]).into())?;
            tx.flush()?;
        }

        let mut rx = server.receiver()?;

        let mut rejecting: Value = NDoublesValue::with_values(vec![9.; 4]).into();
        let err = rx.receive_value(&mut rejecting).unwrap_err();
        assert!(
            matches!(
                err,
                NetworkError::Value(ValueError::ShrinkRejected { from: 4, to: 2, .. })
            ),
            "{err:?}"
        );
        assert_eq!(Value::from(NDoublesValue::with_values(vec![9.; 4])), rejecting);
        assert_eq!(42u32, rx.get::<u32>()?);

        let mut ignoring = NDoublesValue::with_values(vec![9.; 4]);
        ignoring.config.shrink_policy = ShrinkPolicy::WarnAndIgnore;
        let mut ignoring = Value::from(ignoring);
        rx.receive_value(&mut ignoring)?;
        assert_eq!(4, ignoring.byte_size() / 8);
        assert_eq!(9., ignoring.as_f64());
        Ok(())
    }

    #[test]
    fn huge_element_count_runs_into_end_of_stream() -> Result<()> {
        let priors = [
            Value::from(NDoublesValue::new(0)),
            Value::from(HistogramValue::with_bins(0., 1., vec![5.])),
        ];
        for prior in priors {
            let (a, b) = pipe();
            let server = Connection::new(a)?;
            let PipeEnd { mut writer, .. } = b;
            if let Value::Histogram(_) = prior {
                writer.write_all(&(-1f64).to_ne_bytes())?;
                writer.write_all(&2f64.to_ne_bytes())?;
            }
            writer.write_all(&(1u64 << 62).to_ne_bytes())?;
            writer.write_all(&1.5f64.to_ne_bytes())?;
            writer.write_all(&2.5f64.to_ne_bytes())?;
            drop(writer);

            let mut received = prior.clone();
            let err = server.receiver()?.receive_value(&mut received).unwrap_err();
            assert!(err.is_disconnect(), "{err:?}");
            assert_eq!(prior, received);
        }
        Ok(())
    }

    #[test]
    fn rejected_histogram_keeps_its_bounds() -> Result<()> {
        let (client, server) = connected()?;
        {
            let mut tx = client.sender()?;
            let narrow = HistogramValue::with_bins(-50., 50., vec![9.]);
            tx.send_value(&narrow.clone().into())?;
            tx.send_value(&narrow.into())?;
            tx.put(42u32)?;
            tx.flush()?;
        }

        let prior = HistogramValue::with_bins(0., 4., vec![1., 2., 3.]);
        let mut rx = server.receiver()?;

        let mut rejecting = Value::from(prior.clone());
        let err = rx.receive_value(&mut rejecting).unwrap_err();
        assert!(
            matches!(
                err,
                NetworkError::Value(ValueError::ShrinkRejected { from: 3, to: 1, .. })
            ),
            "{err:?}"
        );
        assert_eq!(Value::from(prior.clone()), rejecting);

        let mut ignoring = prior.clone();
        ignoring.shrink_policy = ShrinkPolicy::WarnAndIgnore;
        let mut ignoring = Value::from(ignoring);
        rx.receive_value(&mut ignoring)?;
        match &ignoring {
            Value::Histogram(h) => {
                assert_eq!((0., 4.), (h.min, h.max));
                assert_eq!(prior.bins(), h.bins());
            }
            other => panic!("{other:?}"),
        }
        assert_eq!(42u32, rx.get::<u32>()?);
        Ok(())
    }

    #[test]
    fn reading_stops_when_asked() -> Result<()> {
        let (client, server) = connected()?;
        {
            let mut tx = client.sender()?;
            for i in 0..3u32 {
                tx.put(i)?;
            }
            tx.flush()?;
        }

        let mut seen = vec![];
        server.read_until_stopped(|conn| {
            seen.push(conn.receiver()?.get::<u32>()?);
            if seen.len() == 2 {
                conn.stop_reading();
            }
            Ok(())
        })?;
        assert_eq!(vec![0, 1], seen);
        assert!(server.is_established());
        assert_eq!(2u32, server.receiver()?.get::<u32>()?);
        Ok(())
    }

    #[test]
    fn reading_ends_when_peer_disconnects() -> Result<()> {
        let (client, server) = connected()?;
        {
            let mut tx = client.sender()?;
            tx.put(5u32)?;
            tx.flush()?;
        }
        client.disconnect()?;
        assert!(!client.is_established());

        let mut seen = vec![];
        server.read_until_stopped(|conn| {
            seen.push(conn.receiver()?.get::<u32>()?);
            Ok(())
        })?;
        assert_eq!(vec![5], seen);
        assert!(!server.is_established());
        Ok(())
    }
}
